//! The match engine: long-lived model state behind named operations.
//!
//! The success ensemble and the feed-forward scorer are published as
//! immutable `Arc` snapshots. Readers clone the current `Arc` and work on it
//! without holding a lock; training clones the snapshot, trains the copy and
//! swaps it in, so a reader sees either the old model or the new one and
//! never a half-trained one. The bandit and the forecaster are small and
//! mutated in place behind a mutex.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{MatchError, Result};
use crate::matching::{
    Candidate, CandidateFeatures, CompositeScorer, JobPosting, MatchResult, QueryAnalyzer,
    SearchFacets,
};
use crate::ml::bandit::{ArmStats, EpsilonGreedyBandit};
use crate::ml::clustering::{ClusteringResult, KMeans};
use crate::ml::ensemble::BootstrapEnsemble;
use crate::ml::forecast::TrendForecaster;
use crate::ml::network::FeedForwardNetwork;
use crate::ml::sentiment::{FeedbackSummary, SentimentAnalyzer, SentimentLexicon, SentimentResult};
use crate::ml::{FeatureVector, TrainingStats};
use crate::util::numeric::mean;

/// Predicted outcome for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessPrediction {
    /// Label with the most tree votes.
    pub label: usize,
    /// Vote share of `label`, in `[0, 1]`.
    pub confidence: f64,
    /// Vote share per label, ordered by label id.
    pub votes: Vec<(usize, f64)>,
}

/// Orchestrates the scoring toolkit for the service layer.
pub struct MatchEngine {
    config: EngineConfig,
    kmeans: KMeans,
    ensemble: RwLock<Arc<BootstrapEnsemble>>,
    network: RwLock<Arc<FeedForwardNetwork>>,
    // Held for the whole clone-train-swap of either model.
    training: Mutex<()>,
    sentiment: SentimentAnalyzer,
    forecaster: Mutex<TrendForecaster>,
    bandit: Mutex<EpsilonGreedyBandit>,
    analyzer: QueryAnalyzer,
    scorer: CompositeScorer,
}

impl MatchEngine {
    /// Build an engine with untrained models.
    pub fn new(config: EngineConfig) -> Result<Self> {
        if config.network.input_size != CandidateFeatures::DIMENSION {
            return Err(MatchError::invalid_argument(format!(
                "engine: network input_size must be {} to match the feature layout, got {}",
                CandidateFeatures::DIMENSION,
                config.network.input_size
            )));
        }

        let network = FeedForwardNetwork::new(config.network.clone())?;
        let bandit = EpsilonGreedyBandit::new(&config.bandit)?;
        let scorer = CompositeScorer::new(config.scoring.clone())?;

        info!(
            trees = config.ensemble.num_trees,
            arms = config.bandit.arms,
            epsilon = config.bandit.epsilon,
            "match engine created"
        );

        Ok(Self {
            kmeans: KMeans::new(config.clustering.clone()),
            ensemble: RwLock::new(Arc::new(BootstrapEnsemble::new(config.ensemble.clone()))),
            network: RwLock::new(Arc::new(network)),
            training: Mutex::new(()),
            sentiment: SentimentAnalyzer::new(SentimentLexicon::shared(), config.sentiment.clone()),
            forecaster: Mutex::new(TrendForecaster::new()),
            bandit: Mutex::new(bandit),
            analyzer: QueryAnalyzer::default(),
            scorer,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current success-model snapshot.
    pub fn success_model(&self) -> Arc<BootstrapEnsemble> {
        Arc::clone(&self.ensemble.read())
    }

    /// Current scorer snapshot.
    pub fn scorer_model(&self) -> Arc<FeedForwardNetwork> {
        Arc::clone(&self.network.read())
    }

    /// Group candidates into `k` cohorts by their feature vectors.
    pub fn cluster_candidates(
        &self,
        candidates: &[Candidate],
        k: usize,
    ) -> Result<ClusteringResult> {
        let vectors = CandidateFeatures::extract_all(candidates);
        self.kmeans
            .fit(&vectors, k)
            .inspect_err(|e| warn!(error = %e, k, "cluster_candidates rejected"))
    }

    /// Train the success classifier and publish it.
    pub fn train_success_model(
        &self,
        candidates: &[Candidate],
        labels: &[usize],
    ) -> Result<TrainingStats> {
        let features = CandidateFeatures::extract_all(candidates);

        let _guard = self.training.lock();
        let mut next = BootstrapEnsemble::clone(&self.ensemble.read());
        let stats = next
            .train(&features, labels)
            .inspect_err(|e| warn!(error = %e, "train_success_model rejected"))?;
        *self.ensemble.write() = Arc::new(next);

        info!(samples = candidates.len(), "success model snapshot swapped");
        Ok(stats)
    }

    /// Predict a candidate's outcome label.
    pub fn predict_success(&self, candidate: &Candidate) -> Result<SuccessPrediction> {
        let model = self.success_model();
        let features = CandidateFeatures::extract(candidate);
        let votes = model.predict_votes(&features)?;
        let label = model.predict(&features)?;
        let confidence = votes
            .iter()
            .find(|(l, _)| *l == label)
            .map_or(0.0, |(_, share)| *share);
        Ok(SuccessPrediction {
            label,
            confidence,
            votes,
        })
    }

    /// Continue training the feed-forward scorer and publish it.
    ///
    /// Each target holds one value in `[0, 1]` per output unit.
    pub fn train_scorer(
        &self,
        candidates: &[Candidate],
        targets: &[FeatureVector],
        epochs: usize,
    ) -> Result<TrainingStats> {
        let inputs = CandidateFeatures::extract_all(candidates);

        let _guard = self.training.lock();
        let mut next = FeedForwardNetwork::clone(&self.network.read());
        let stats = next
            .train(&inputs, targets, epochs)
            .inspect_err(|e| warn!(error = %e, "train_scorer rejected"))?;
        if !next.weights().is_finite() {
            warn!("train_scorer produced non-finite weights; keeping previous snapshot");
            return Err(MatchError::invalid_argument(
                "engine: trained scorer weights are not finite",
            ));
        }
        *self.network.write() = Arc::new(next);

        info!(
            samples = candidates.len(),
            epochs,
            loss = stats.final_training_loss,
            "scorer snapshot swapped"
        );
        Ok(stats)
    }

    /// Run a candidate through the trained scorer.
    pub fn score_features(&self, candidate: &Candidate) -> Result<FeatureVector> {
        let model = self.scorer_model();
        if !model.is_trained() {
            return Err(MatchError::not_trained("feed-forward scorer has not been trained"));
        }
        model.predict(&CandidateFeatures::extract(candidate))
    }

    pub fn analyze_feedback(&self, text: &str) -> SentimentResult {
        self.sentiment.analyze(text)
    }

    pub fn analyze_feedback_batch<S: AsRef<str>>(&self, texts: &[S]) -> FeedbackSummary {
        self.sentiment.analyze_batch(texts)
    }

    /// Append one observation to the engine's trend series.
    pub fn record_trend(&self, value: f64) -> Result<()> {
        self.forecaster
            .lock()
            .add_observation(value)
            .inspect_err(|e| warn!(error = %e, "record_trend rejected"))
    }

    /// Forecast the engine's trend series.
    pub fn forecast_trends(&self, periods: usize) -> Vec<f64> {
        self.forecaster.lock().predict(periods)
    }

    /// Forecast a caller-supplied series without touching engine state.
    pub fn forecast_series(&self, history: &[f64], periods: usize) -> Result<Vec<f64>> {
        Ok(TrendForecaster::with_history(history)?.predict(periods))
    }

    /// Pick the recommendation strategy to use next.
    pub fn optimize_recommendations(&self) -> usize {
        let arm = self.bandit.lock().select_arm();
        debug!(arm, "recommendation strategy selected");
        arm
    }

    /// Feed back the reward observed for a strategy.
    pub fn record_recommendation_reward(&self, arm: usize, reward: f64) -> Result<()> {
        self.bandit
            .lock()
            .update_arm(arm, reward)
            .inspect_err(|e| warn!(error = %e, arm, "record_recommendation_reward rejected"))
    }

    pub fn arm_stats(&self) -> Vec<ArmStats> {
        self.bandit.lock().arm_stats().to_vec()
    }

    /// Parse a free-text query.
    pub fn analyze_query(&self, query: &str) -> SearchFacets {
        self.analyzer.analyze(query)
    }

    /// Score one candidate against parsed facets.
    pub fn compute_composite_score(
        &self,
        candidate: &Candidate,
        facets: &SearchFacets,
    ) -> MatchResult {
        let models = self.blend_models();
        let signal = models
            .as_ref()
            .and_then(|(ensemble, network)| self.model_signal(candidate, ensemble, network));
        self.scorer.score_with_model(candidate, facets, signal)
    }

    /// Rank candidates against a free-text query.
    pub fn search(
        &self,
        query: &str,
        candidates: &[Candidate],
        limit: Option<usize>,
    ) -> Vec<MatchResult> {
        let facets = self.analyzer.analyze(query);
        debug!(query = %facets.query, skills = facets.skills.len(), "search");
        self.rank(candidates, &facets, limit)
    }

    /// Rank candidates against a job posting.
    pub fn match_job(
        &self,
        job: &JobPosting,
        candidates: &[Candidate],
        limit: Option<usize>,
    ) -> Vec<MatchResult> {
        let facets = self.analyzer.analyze_job(job);
        debug!(job = %job.id, skills = facets.skills.len(), "match job");
        self.rank(candidates, &facets, limit)
    }

    fn rank(
        &self,
        candidates: &[Candidate],
        facets: &SearchFacets,
        limit: Option<usize>,
    ) -> Vec<MatchResult> {
        match self.blend_models() {
            Some((ensemble, network)) => self.scorer.rank_with(candidates, facets, limit, |c| {
                self.model_signal(c, &ensemble, &network)
            }),
            None => self.scorer.rank(candidates, facets, limit),
        }
    }

    /// Model snapshots to blend, if blending is enabled.
    fn blend_models(&self) -> Option<(Arc<BootstrapEnsemble>, Arc<FeedForwardNetwork>)> {
        (self.config.scoring.model_blend > 0.0).then(|| (self.success_model(), self.scorer_model()))
    }

    /// Mean of the trained models' opinions on a `[0, 100]` scale.
    fn model_signal(
        &self,
        candidate: &Candidate,
        ensemble: &BootstrapEnsemble,
        network: &FeedForwardNetwork,
    ) -> Option<f64> {
        let features = CandidateFeatures::extract(candidate);
        let mut signals = Vec::with_capacity(2);
        if ensemble.is_trained()
            && let Ok(votes) = ensemble.predict_votes(&features)
        {
            let share = votes
                .iter()
                .find(|(label, _)| *label == self.config.success_label)
                .map_or(0.0, |(_, share)| *share);
            signals.push(share * 100.0);
        }
        if network.is_trained()
            && let Ok(output) = network.predict(&features)
            && let Some(value) = output.first()
        {
            signals.push(value * 100.0);
        }
        (!signals.is_empty()).then(|| mean(&signals))
    }
}
