//! Linear trend extrapolation over a scalar time series.
//!
//! The forecast base is the mean of the last five observations (or fewer).
//! The trend is the difference between the means of the second and first
//! halves of the series, divided by the half length. Step `i` forecasts
//! `base + trend * i`.

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::util::numeric::{finite_or, mean};

/// Observations averaged to form the forecast base.
const BASE_WINDOW: usize = 5;

/// Append-only forecaster over monthly counts or similar series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendForecaster {
    observations: Vec<f64>,
}

impl TrendForecaster {
    /// Create an empty forecaster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecaster pre-loaded with `history`.
    pub fn with_history(history: &[f64]) -> Result<Self> {
        let mut forecaster = Self::new();
        for &value in history {
            forecaster.add_observation(value)?;
        }
        Ok(forecaster)
    }

    /// Append one observation. Non-finite values are rejected.
    pub fn add_observation(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MatchError::invalid_argument(format!(
                "forecast: observation must be finite, got {value}"
            )));
        }
        self.observations.push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// All observations in arrival order.
    pub fn observations(&self) -> &[f64] {
        &self.observations
    }

    /// Per-period slope of the series; `0.0` with fewer than two points.
    pub fn trend(&self) -> f64 {
        let n = self.observations.len();
        if n < 2 {
            return 0.0;
        }
        let half = n / 2;
        let (first, second) = self.observations.split_at(half);
        finite_or((mean(second) - mean(first)) / half as f64, 0.0)
    }

    /// Forecast `periods` future values.
    ///
    /// With fewer than two observations the forecast is all zeros.
    pub fn predict(&self, periods: usize) -> Vec<f64> {
        let n = self.observations.len();
        if n < 2 {
            return vec![0.0; periods];
        }

        let base = mean(&self.observations[n - BASE_WINDOW.min(n)..]);
        let trend = self.trend();

        (1..=periods)
            .map(|i| finite_or(base + trend * i as f64, 0.0))
            .collect()
    }
}
