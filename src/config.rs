//! Engine-wide configuration.
//!
//! Every section falls back to its defaults when absent, so a file holding
//! only `{"bandit": {"epsilon": 0.2}}` is a complete configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matching::ScoringConfig;
use crate::ml::bandit::BanditConfig;
use crate::ml::clustering::ClusteringConfig;
use crate::ml::ensemble::EnsembleConfig;
use crate::ml::network::NetworkConfig;
use crate::ml::sentiment::SentimentConfig;

/// Configuration of a [`crate::engine::MatchEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub clustering: ClusteringConfig,
    pub ensemble: EnsembleConfig,
    pub network: NetworkConfig,
    pub sentiment: SentimentConfig,
    pub bandit: BanditConfig,
    pub scoring: ScoringConfig,
    /// Ensemble label counted as a successful outcome when blending model
    /// signals into match scores.
    pub success_label: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clustering: ClusteringConfig::default(),
            ensemble: EnsembleConfig::default(),
            network: NetworkConfig::default(),
            sentiment: SentimentConfig::default(),
            bandit: BanditConfig::default(),
            scoring: ScoringConfig::default(),
            success_label: 1,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Apply one seed to every stochastic component.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.clustering.seed = Some(seed);
        self.ensemble.seed = Some(seed);
        self.network.seed = Some(seed);
        self.bandit.seed = Some(seed);
        self
    }
}
