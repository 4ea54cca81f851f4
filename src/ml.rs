//! Machine learning components behind candidate matching.
//!
//! Each component here is a synchronous, single-owner model: clustering of
//! candidate feature vectors, a bootstrap ensemble classifier, a two-layer
//! feed-forward scorer, lexicon sentiment, trend forecasting and an
//! epsilon-greedy bandit. The [`crate::engine::MatchEngine`] holds the
//! long-lived instances and handles concurrent access.

pub mod bandit;
pub mod clustering;
pub mod ensemble;
pub mod forecast;
pub mod network;
pub mod sentiment;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};

/// Fixed-length numeric encoding of a domain entity.
///
/// Length is fixed per model instance and the values carry no unit; callers
/// normalise before handing vectors to a model.
pub type FeatureVector = Vec<f64>;

/// Training statistics reported by iterative models.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Mean loss recorded after every epoch.
    pub training_losses: Vec<f64>,
    /// Number of epochs or trees completed.
    pub iterations: usize,
    /// Training time in milliseconds.
    pub training_time_ms: u64,
    /// Final training loss.
    pub final_training_loss: f64,
    /// When training finished.
    pub trained_at: DateTime<Utc>,
}

/// Check that every vector in `vectors` has the same, non-zero length and
/// return it.
pub(crate) fn common_dimension(vectors: &[FeatureVector], what: &str) -> Result<usize> {
    let first = vectors
        .first()
        .ok_or_else(|| MatchError::invalid_argument(format!("{what}: no feature vectors")))?;
    let dimension = first.len();
    if dimension == 0 {
        return Err(MatchError::invalid_argument(format!(
            "{what}: feature vectors must not be empty"
        )));
    }
    if let Some((index, vector)) = vectors
        .iter()
        .enumerate()
        .find(|(_, v)| v.len() != dimension)
    {
        return Err(MatchError::invalid_argument(format!(
            "{what}: vector {index} has length {}, expected {dimension}",
            vector.len()
        )));
    }
    Ok(dimension)
}
