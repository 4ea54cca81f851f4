//! K-means clustering of candidate feature vectors.
//!
//! Lloyd's heuristic: seed `k` centroids, then alternate between assigning
//! every vector to its nearest centroid and moving each centroid to the mean
//! of its members. Iteration stops when an assignment pass changes nothing or
//! the iteration cap is reached. There is no convergence guarantee beyond the
//! cap.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MatchError, Result};
use crate::ml::{FeatureVector, common_dimension};
use crate::util::numeric::{finite_or, squared_euclidean};
use crate::util::rng::seeded_rng;

/// How the initial centroids are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InitStrategy {
    /// `k` input vectors sampled uniformly with replacement.
    #[default]
    Uniform,
    /// k-means++: later centroids sampled proportionally to squared distance
    /// from the nearest already-chosen centroid.
    KMeansPlusPlus,
}

/// Configuration for k-means clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Maximum number of assign/update rounds.
    pub max_iterations: usize,
    /// Centroid initialisation strategy.
    pub init: InitStrategy,
    /// Seed for reproducible initialisation.
    pub seed: Option<u64>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            init: InitStrategy::Uniform,
            seed: None,
        }
    }
}

/// Outcome of one clustering run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringResult {
    /// Cluster id in `0..k` for every input vector, in input order.
    pub assignments: Vec<usize>,
    /// Final centroid of every cluster.
    pub centroids: Vec<FeatureVector>,
    /// Assign/update rounds actually run.
    pub iterations: usize,
    /// Whether the run stopped because assignments stopped changing.
    pub converged: bool,
    /// Sum of squared distances from each vector to its centroid.
    pub inertia: f64,
}

impl ClusteringResult {
    /// Number of members in each cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &cluster in &self.assignments {
            sizes[cluster] += 1;
        }
        sizes
    }
}

/// K-means clusterer.
#[derive(Debug, Clone, Default)]
pub struct KMeans {
    config: ClusteringConfig,
}

impl KMeans {
    /// Create a clusterer with the given configuration.
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Create a clusterer with default settings and a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(ClusteringConfig {
            seed: Some(seed),
            ..ClusteringConfig::default()
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Assign each vector to one of `k` clusters.
    pub fn cluster(&self, vectors: &[FeatureVector], k: usize) -> Result<Vec<usize>> {
        Ok(self.fit(vectors, k)?.assignments)
    }

    /// Run k-means and return assignments together with centroids and
    /// run statistics.
    pub fn fit(&self, vectors: &[FeatureVector], k: usize) -> Result<ClusteringResult> {
        if k == 0 || k > vectors.len() {
            return Err(MatchError::invalid_argument(format!(
                "k must be in [1, {}], got {k}",
                vectors.len()
            )));
        }
        let dimension = common_dimension(vectors, "clustering")?;

        let mut rng = seeded_rng(self.config.seed);
        let mut centroids = match self.config.init {
            InitStrategy::Uniform => Self::init_uniform(vectors, k, &mut rng),
            InitStrategy::KMeansPlusPlus => Self::init_kmeans_plus_plus(vectors, k, &mut rng),
        };

        let mut assignments: Vec<usize> = Vec::new();
        let mut iterations = 0;
        let mut converged = false;

        for _ in 0..self.config.max_iterations {
            iterations += 1;
            let next = Self::assign(vectors, &centroids);
            let unchanged = next == assignments;
            assignments = next;

            Self::update_centroids(vectors, &assignments, &mut centroids, dimension);

            if unchanged {
                converged = true;
                break;
            }
        }

        // A zero iteration cap still has to honour the length contract.
        if assignments.is_empty() {
            assignments = Self::assign(vectors, &centroids);
        }

        let inertia = finite_or(
            vectors
                .iter()
                .zip(assignments.iter())
                .map(|(v, &c)| squared_euclidean(v, &centroids[c]))
                .sum(),
            0.0,
        );

        debug!(k, iterations, converged, inertia, "k-means finished");

        Ok(ClusteringResult {
            assignments,
            centroids,
            iterations,
            converged,
            inertia,
        })
    }

    fn init_uniform(vectors: &[FeatureVector], k: usize, rng: &mut StdRng) -> Vec<FeatureVector> {
        (0..k)
            .map(|_| vectors[rng.random_range(0..vectors.len())].clone())
            .collect()
    }

    fn init_kmeans_plus_plus(
        vectors: &[FeatureVector],
        k: usize,
        rng: &mut StdRng,
    ) -> Vec<FeatureVector> {
        let mut centroids = Vec::with_capacity(k);
        centroids.push(vectors[rng.random_range(0..vectors.len())].clone());

        while centroids.len() < k {
            let weights: Vec<f64> = vectors
                .iter()
                .map(|v| {
                    centroids
                        .iter()
                        .map(|c| squared_euclidean(v, c))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect();
            let total: f64 = weights.iter().sum();

            if total <= 0.0 || !total.is_finite() {
                // Every vector already coincides with a centroid.
                centroids.push(vectors[rng.random_range(0..vectors.len())].clone());
                continue;
            }

            let target = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = vectors.len() - 1;
            for (i, &weight) in weights.iter().enumerate() {
                cumulative += weight;
                if cumulative >= target {
                    chosen = i;
                    break;
                }
            }
            centroids.push(vectors[chosen].clone());
        }

        centroids
    }

    /// Nearest centroid per vector; ties go to the lowest cluster index.
    fn assign(vectors: &[FeatureVector], centroids: &[FeatureVector]) -> Vec<usize> {
        vectors
            .iter()
            .map(|vector| {
                let mut best_cluster = 0;
                let mut best_distance = f64::INFINITY;
                for (i, centroid) in centroids.iter().enumerate() {
                    let distance = squared_euclidean(vector, centroid);
                    if distance < best_distance {
                        best_distance = distance;
                        best_cluster = i;
                    }
                }
                best_cluster
            })
            .collect()
    }

    fn update_centroids(
        vectors: &[FeatureVector],
        assignments: &[usize],
        centroids: &mut [FeatureVector],
        dimension: usize,
    ) {
        let k = centroids.len();
        let mut sums = vec![vec![0.0; dimension]; k];
        let mut counts = vec![0usize; k];

        for (vector, &cluster) in vectors.iter().zip(assignments.iter()) {
            counts[cluster] += 1;
            for (sum, &value) in sums[cluster].iter_mut().zip(vector.iter()) {
                *sum += value;
            }
        }

        for ((centroid, sum), &count) in centroids.iter_mut().zip(sums).zip(counts.iter()) {
            if count == 0 {
                // Empty cluster keeps its previous centroid.
                continue;
            }
            for (c, s) in centroid.iter_mut().zip(sum) {
                *c = finite_or(s / count as f64, *c);
            }
        }
    }
}
