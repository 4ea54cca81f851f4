//! Two-layer feed-forward scorer.
//!
//! `hidden = sigmoid(input · W1 + b1)`, `output = sigmoid(hidden · W2 + b2)`.
//! Weights and biases start uniform in `[-1, 1]` and are fitted with plain
//! online backpropagation on squared error.

use std::time::Instant;

use chrono::Utc;
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MatchError, Result};
use crate::ml::{FeatureVector, TrainingStats};
use crate::util::numeric::{finite_or, sigmoid, sigmoid_derivative};
use crate::util::rng::seeded_rng;

/// Configuration for the feed-forward scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Input units; must match the feature layout fed to the scorer.
    pub input_size: usize,
    /// Hidden units.
    pub hidden_size: usize,
    /// Output units.
    pub output_size: usize,
    /// Step size for gradient updates.
    pub learning_rate: f64,
    /// Seed for reproducible weight initialisation.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            input_size: 5,
            hidden_size: 8,
            output_size: 1,
            learning_rate: 0.5,
            seed: None,
        }
    }
}

/// Weights and biases of the two layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkWeights {
    /// `input_size x hidden_size`.
    pub input_hidden: Vec<Vec<f64>>,
    /// `hidden_size`.
    pub hidden_bias: Vec<f64>,
    /// `hidden_size x output_size`.
    pub hidden_output: Vec<Vec<f64>>,
    /// `output_size`.
    pub output_bias: Vec<f64>,
}

impl NetworkWeights {
    /// Whether every weight and bias is a finite number.
    pub fn is_finite(&self) -> bool {
        self.input_hidden
            .iter()
            .chain(self.hidden_output.iter())
            .flatten()
            .chain(self.hidden_bias.iter())
            .chain(self.output_bias.iter())
            .all(|v| v.is_finite())
    }
}

/// Feed-forward network producing a small score vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedForwardNetwork {
    config: NetworkConfig,
    weights: NetworkWeights,
    trained: bool,
}

impl FeedForwardNetwork {
    /// Create a network with randomly initialised weights.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        if config.input_size == 0 || config.hidden_size == 0 || config.output_size == 0 {
            return Err(MatchError::invalid_argument(
                "network: layer sizes must be at least 1",
            ));
        }
        if !(config.learning_rate.is_finite() && config.learning_rate > 0.0) {
            return Err(MatchError::invalid_argument(
                "network: learning rate must be positive",
            ));
        }

        let mut rng = seeded_rng(config.seed);
        let input_hidden = random_matrix(&mut rng, config.input_size, config.hidden_size);
        let hidden_bias = random_vector(&mut rng, config.hidden_size);
        let hidden_output = random_matrix(&mut rng, config.hidden_size, config.output_size);
        let output_bias = random_vector(&mut rng, config.output_size);

        Ok(Self {
            config,
            weights: NetworkWeights {
                input_hidden,
                hidden_bias,
                hidden_output,
                output_bias,
            },
            trained: false,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Current weights.
    pub fn weights(&self) -> &NetworkWeights {
        &self.weights
    }

    /// Whether `train` has completed at least once.
    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Forward pass: one value in `(0, 1)` per output unit.
    pub fn predict(&self, input: &[f64]) -> Result<FeatureVector> {
        self.check_input(input)?;
        let (_, output) = self.forward(input);
        Ok(output.into_iter().map(|v| finite_or(v, 0.5)).collect())
    }

    /// Fit the network with `epochs` passes of online backpropagation.
    pub fn train(
        &mut self,
        inputs: &[FeatureVector],
        targets: &[FeatureVector],
        epochs: usize,
    ) -> Result<TrainingStats> {
        if inputs.is_empty() {
            return Err(MatchError::invalid_argument(
                "network: training set must not be empty",
            ));
        }
        if inputs.len() != targets.len() {
            return Err(MatchError::invalid_argument(format!(
                "network: {} inputs but {} targets",
                inputs.len(),
                targets.len()
            )));
        }
        if epochs == 0 {
            return Err(MatchError::invalid_argument(
                "network: epochs must be at least 1",
            ));
        }
        for input in inputs {
            self.check_input(input)?;
        }
        if let Some(target) = targets
            .iter()
            .find(|t| t.len() != self.config.output_size)
        {
            return Err(MatchError::invalid_argument(format!(
                "network: expected {} target values, got {}",
                self.config.output_size,
                target.len()
            )));
        }
        if inputs
            .iter()
            .chain(targets.iter())
            .flatten()
            .any(|v| !v.is_finite())
        {
            return Err(MatchError::invalid_argument(
                "network: inputs and targets must be finite",
            ));
        }

        let start_time = Instant::now();
        let previous = self.weights.clone();
        let mut training_losses = Vec::with_capacity(epochs);

        for _ in 0..epochs {
            let mut epoch_loss = 0.0;
            for (input, target) in inputs.iter().zip(targets.iter()) {
                epoch_loss += self.backpropagate(input, target);
            }
            let mean_loss = epoch_loss / (inputs.len() * self.config.output_size) as f64;
            training_losses.push(finite_or(mean_loss, 0.0));
        }

        if !self.weights.is_finite() {
            self.weights = previous;
            return Err(MatchError::invalid_argument(
                "network: training diverged to non-finite weights",
            ));
        }

        self.trained = true;
        let final_training_loss = training_losses.last().copied().unwrap_or(0.0);

        info!(
            epochs,
            samples = inputs.len(),
            final_training_loss,
            "feed-forward scorer trained"
        );

        Ok(TrainingStats {
            training_losses,
            iterations: epochs,
            training_time_ms: start_time.elapsed().as_millis() as u64,
            final_training_loss,
            trained_at: Utc::now(),
        })
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.config.input_size {
            return Err(MatchError::invalid_argument(format!(
                "network: expected {} inputs, got {}",
                self.config.input_size,
                input.len()
            )));
        }
        Ok(())
    }

    fn forward(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let w = &self.weights;
        let hidden: Vec<f64> = (0..self.config.hidden_size)
            .map(|h| {
                let sum: f64 = input
                    .iter()
                    .zip(w.input_hidden.iter())
                    .map(|(x, row)| x * row[h])
                    .sum();
                sigmoid(sum + w.hidden_bias[h])
            })
            .collect();
        let output: Vec<f64> = (0..self.config.output_size)
            .map(|o| {
                let sum: f64 = hidden
                    .iter()
                    .zip(w.hidden_output.iter())
                    .map(|(a, row)| a * row[o])
                    .sum();
                sigmoid(sum + w.output_bias[o])
            })
            .collect();
        (hidden, output)
    }

    /// One gradient step on a single pair; returns its summed squared error.
    fn backpropagate(&mut self, input: &[f64], target: &[f64]) -> f64 {
        let (hidden, output) = self.forward(input);
        let rate = self.config.learning_rate;

        let output_delta: Vec<f64> = output
            .iter()
            .zip(target.iter())
            .map(|(&out, &t)| (t - out) * sigmoid_derivative(out))
            .collect();

        // Hidden deltas use W2 before it is updated.
        let hidden_delta: Vec<f64> = hidden
            .iter()
            .zip(self.weights.hidden_output.iter())
            .map(|(&a, row)| {
                let back: f64 = row.iter().zip(output_delta.iter()).map(|(w, d)| w * d).sum();
                back * sigmoid_derivative(a)
            })
            .collect();

        let w = &mut self.weights;
        for (row, &a) in w.hidden_output.iter_mut().zip(hidden.iter()) {
            for (weight, &d) in row.iter_mut().zip(output_delta.iter()) {
                *weight += rate * d * a;
            }
        }
        for (bias, &d) in w.output_bias.iter_mut().zip(output_delta.iter()) {
            *bias += rate * d;
        }
        for (row, &x) in w.input_hidden.iter_mut().zip(input.iter()) {
            for (weight, &d) in row.iter_mut().zip(hidden_delta.iter()) {
                *weight += rate * d * x;
            }
        }
        for (bias, &d) in w.hidden_bias.iter_mut().zip(hidden_delta.iter()) {
            *bias += rate * d;
        }

        output
            .iter()
            .zip(target.iter())
            .map(|(out, t)| (t - out) * (t - out))
            .sum()
    }
}

fn random_vector(rng: &mut StdRng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.random_range(-1.0..=1.0)).collect()
}

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Vec<Vec<f64>> {
    (0..rows).map(|_| random_vector(rng, cols)).collect()
}
