//! Bootstrap ensemble classifier (a small random forest).
//!
//! Training draws `num_trees` bootstrap samples, each the size of the
//! training set and drawn with replacement, and fits one depth-limited
//! decision tree per sample. Trees split on the feature/threshold pair with
//! the lowest weighted Gini impurity. Prediction is a majority vote across
//! trees, ties going to the lowest label id.
//!
//! With `max_depth = 0` every tree is a single leaf holding the majority
//! label of its bootstrap sample. Such a forest ignores its input and
//! converges on the global majority label of the training set.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MatchError, Result};
use crate::ml::{FeatureVector, TrainingStats, common_dimension};
use crate::util::rng::seeded_rng;

/// Configuration for the bootstrap ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Number of trees (one bootstrap sample each).
    pub num_trees: usize,
    /// Maximum tree depth. `0` yields majority-class stumps.
    pub max_depth: usize,
    /// Minimum samples a node needs before it may split.
    pub min_samples_split: usize,
    /// Seed for reproducible bootstrap sampling.
    pub seed: Option<u64>,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            num_trees: 10,
            max_depth: 3,
            min_samples_split: 2,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        label: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// A single base learner: a Gini decision tree over one bootstrap sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
}

impl DecisionTree {
    /// Fit a tree on the samples selected by `indices`.
    fn fit(
        features: &[FeatureVector],
        labels: &[usize],
        indices: &[usize],
        max_depth: usize,
        min_samples_split: usize,
    ) -> Self {
        Self {
            root: Self::build(features, labels, indices, 0, max_depth, min_samples_split),
        }
    }

    /// Predict a label for one feature vector.
    pub fn predict(&self, features: &[f64]) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { label } => return *label,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Depth of the tree; a single leaf has depth 0.
    pub fn depth(&self) -> usize {
        fn depth_of(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }

    fn build(
        features: &[FeatureVector],
        labels: &[usize],
        indices: &[usize],
        depth: usize,
        max_depth: usize,
        min_samples_split: usize,
    ) -> TreeNode {
        let counts = label_counts(indices.iter().map(|&i| labels[i]));
        let label = majority_label(&counts);

        if depth >= max_depth || indices.len() < min_samples_split.max(2) || counts.len() < 2 {
            return TreeNode::Leaf { label };
        }

        let parent_impurity = gini(&counts, indices.len());
        match Self::find_best_split(features, labels, indices) {
            Some((feature, threshold, impurity)) if impurity < parent_impurity => {
                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .copied()
                    .partition(|&i| features[i][feature] <= threshold);
                if left_indices.is_empty() || right_indices.is_empty() {
                    return TreeNode::Leaf { label };
                }

                TreeNode::Split {
                    feature,
                    threshold,
                    left: Box::new(Self::build(
                        features,
                        labels,
                        &left_indices,
                        depth + 1,
                        max_depth,
                        min_samples_split,
                    )),
                    right: Box::new(Self::build(
                        features,
                        labels,
                        &right_indices,
                        depth + 1,
                        max_depth,
                        min_samples_split,
                    )),
                }
            }
            _ => TreeNode::Leaf { label },
        }
    }

    /// Find the split with the lowest weighted Gini impurity.
    ///
    /// Thresholds are midpoints between consecutive distinct feature values,
    /// so both sides of a returned split are non-empty.
    fn find_best_split(
        features: &[FeatureVector],
        labels: &[usize],
        indices: &[usize],
    ) -> Option<(usize, f64, f64)> {
        let dimension = features[indices[0]].len();
        let total = indices.len();
        let mut best: Option<(usize, f64, f64)> = None;

        for feature in 0..dimension {
            let mut values: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (features[i][feature], labels[i]))
                .collect();
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left: BTreeMap<usize, usize> = BTreeMap::new();
            let mut right = label_counts(values.iter().map(|&(_, label)| label));

            for i in 1..values.len() {
                let label = values[i - 1].1;
                *left.entry(label).or_insert(0) += 1;
                if let Some(count) = right.get_mut(&label) {
                    *count -= 1;
                    if *count == 0 {
                        right.remove(&label);
                    }
                }

                if values[i - 1].0 == values[i].0 {
                    continue;
                }

                let left_n = i;
                let right_n = total - i;
                let impurity = (left_n as f64 * gini(&left, left_n)
                    + right_n as f64 * gini(&right, right_n))
                    / total as f64;

                if best.is_none_or(|(_, _, b)| impurity < b) {
                    let threshold = (values[i - 1].0 + values[i].0) / 2.0;
                    best = Some((feature, threshold, impurity));
                }
            }
        }

        best
    }
}

fn label_counts(labels: impl Iterator<Item = usize>) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Most frequent label; ties go to the lowest label id.
fn majority_label(counts: &BTreeMap<usize, usize>) -> usize {
    let mut best_label = 0;
    let mut best_count = 0;
    for (&label, &count) in counts {
        if count > best_count {
            best_label = label;
            best_count = count;
        }
    }
    best_label
}

fn gini(counts: &BTreeMap<usize, usize>, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .values()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Bootstrap ensemble of decision trees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapEnsemble {
    config: EnsembleConfig,
    trees: Vec<DecisionTree>,
    dimension: Option<usize>,
    labels: BTreeSet<usize>,
}

impl BootstrapEnsemble {
    /// Create an untrained ensemble.
    pub fn new(config: EnsembleConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            dimension: None,
            labels: BTreeSet::new(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    /// Train on `features` with one label per row, replacing any earlier
    /// trees wholesale.
    pub fn train(&mut self, features: &[FeatureVector], labels: &[usize]) -> Result<TrainingStats> {
        if features.is_empty() {
            return Err(MatchError::invalid_argument(
                "ensemble: training set must not be empty",
            ));
        }
        if features.len() != labels.len() {
            return Err(MatchError::invalid_argument(format!(
                "ensemble: {} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if self.config.num_trees == 0 {
            return Err(MatchError::invalid_argument(
                "ensemble: num_trees must be at least 1",
            ));
        }
        let dimension = common_dimension(features, "ensemble")?;

        let start_time = Instant::now();
        let mut rng = seeded_rng(self.config.seed);
        let n = features.len();

        let trees: Vec<DecisionTree> = (0..self.config.num_trees)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                DecisionTree::fit(
                    features,
                    labels,
                    &sample,
                    self.config.max_depth,
                    self.config.min_samples_split,
                )
            })
            .collect();

        let training_error = labels
            .iter()
            .zip(features.iter())
            .filter(|(label, row)| vote(&trees, row).0 != **label)
            .count() as f64
            / n as f64;

        self.trees = trees;
        self.dimension = Some(dimension);
        self.labels = labels.iter().copied().collect();

        let stats = TrainingStats {
            training_losses: vec![training_error],
            iterations: self.trees.len(),
            training_time_ms: start_time.elapsed().as_millis() as u64,
            final_training_loss: training_error,
            trained_at: Utc::now(),
        };

        info!(
            trees = self.trees.len(),
            samples = n,
            training_error,
            "bootstrap ensemble trained"
        );

        Ok(stats)
    }

    /// Predict the label with the most tree votes.
    pub fn predict(&self, features: &[f64]) -> Result<usize> {
        self.check_input(features)?;
        Ok(vote(&self.trees, features).0)
    }

    /// Vote share per label, ordered by label id.
    pub fn predict_votes(&self, features: &[f64]) -> Result<Vec<(usize, f64)>> {
        self.check_input(features)?;
        let (_, counts) = vote(&self.trees, features);
        let total = self.trees.len() as f64;
        Ok(counts
            .into_iter()
            .map(|(label, count)| (label, count as f64 / total))
            .collect())
    }

    /// Check if the ensemble has been trained.
    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Number of trained trees.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// The trained trees.
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Labels seen during the last training run.
    pub fn known_labels(&self) -> &BTreeSet<usize> {
        &self.labels
    }

    fn check_input(&self, features: &[f64]) -> Result<()> {
        let dimension = self
            .dimension
            .filter(|_| self.is_trained())
            .ok_or_else(|| MatchError::not_trained("bootstrap ensemble has no trees"))?;
        if features.len() != dimension {
            return Err(MatchError::invalid_argument(format!(
                "ensemble: expected {dimension} features, got {}",
                features.len()
            )));
        }
        debug!(trees = self.trees.len(), "ensemble predict");
        Ok(())
    }
}

fn vote(trees: &[DecisionTree], features: &[f64]) -> (usize, BTreeMap<usize, usize>) {
    let counts = label_counts(trees.iter().map(|tree| tree.predict(features)));
    (majority_label(&counts), counts)
}
