//! Epsilon-greedy multi-armed bandit for recommendation strategies.
//!
//! With probability `epsilon` a uniformly random arm is explored; otherwise
//! the arm with the highest running mean reward is exploited, ties going to
//! the lowest index.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MatchError, Result};
use crate::util::rng::seeded_rng;

/// Configuration for the bandit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BanditConfig {
    /// Number of arms.
    pub arms: usize,
    /// Exploration probability in `[0, 1]`.
    pub epsilon: f64,
    /// Seed for reproducible exploration.
    pub seed: Option<u64>,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            arms: 4,
            epsilon: 0.1,
            seed: None,
        }
    }
}

/// Trial count and running mean reward of one arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmStats {
    pub count: u64,
    pub value: f64,
}

/// Epsilon-greedy arm selector.
#[derive(Debug, Clone)]
pub struct EpsilonGreedyBandit {
    epsilon: f64,
    arms: Vec<ArmStats>,
    rng: StdRng,
}

impl EpsilonGreedyBandit {
    /// Create a bandit with zeroed statistics.
    pub fn new(config: &BanditConfig) -> Result<Self> {
        if config.arms == 0 {
            return Err(MatchError::invalid_argument(
                "bandit: at least one arm is required",
            ));
        }
        if !(0.0..=1.0).contains(&config.epsilon) {
            return Err(MatchError::invalid_argument(format!(
                "bandit: epsilon must be in [0, 1], got {}",
                config.epsilon
            )));
        }
        Ok(Self {
            epsilon: config.epsilon,
            arms: vec![ArmStats::default(); config.arms],
            rng: seeded_rng(config.seed),
        })
    }

    /// Number of arms.
    pub fn num_arms(&self) -> usize {
        self.arms.len()
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Choose an arm index in `[0, arms)`.
    pub fn select_arm(&mut self) -> usize {
        if self.epsilon > 0.0 && self.rng.random_bool(self.epsilon) {
            let arm = self.rng.random_range(0..self.arms.len());
            debug!(arm, "bandit explored");
            arm
        } else {
            self.best_arm()
        }
    }

    /// Arm with the highest mean reward, ties to the lowest index.
    pub fn best_arm(&self) -> usize {
        let mut best = 0;
        for (i, arm) in self.arms.iter().enumerate().skip(1) {
            if arm.value > self.arms[best].value {
                best = i;
            }
        }
        best
    }

    /// Record a reward for `arm` with an incremental mean update.
    pub fn update_arm(&mut self, arm: usize, reward: f64) -> Result<()> {
        if !reward.is_finite() {
            return Err(MatchError::invalid_argument(format!(
                "bandit: reward must be finite, got {reward}"
            )));
        }
        let num_arms = self.arms.len();
        let stats = self.arms.get_mut(arm).ok_or_else(|| {
            MatchError::invalid_argument(format!(
                "bandit: arm {arm} out of range for {num_arms} arms"
            ))
        })?;
        stats.count += 1;
        stats.value += (reward - stats.value) / stats.count as f64;
        Ok(())
    }

    /// Snapshot of every arm's statistics.
    pub fn arm_stats(&self) -> &[ArmStats] {
        &self.arms
    }
}
