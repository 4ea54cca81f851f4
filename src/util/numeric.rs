//! Numeric guards shared by every scoring component.
//!
//! Nothing that leaves the crate may be NaN or infinite. Components route
//! their final values through [`finite_or`] or [`clamp_score`] so a
//! zero-length division turns into a documented default instead.

/// Return `value` if it is finite, otherwise `default`.
#[inline]
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

/// Clamp a score into `[min, max]`, mapping non-finite input to `min`.
#[inline]
pub fn clamp_score(value: f64, min: f64, max: f64) -> f64 {
    finite_or(value, min).clamp(min, max)
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    finite_or(values.iter().sum::<f64>() / values.len() as f64, 0.0)
}

/// Squared Euclidean distance. Callers check lengths beforehand.
#[inline]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Euclidean distance between two equal-length vectors.
#[inline]
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Logistic sigmoid `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of the sigmoid expressed through its output `s = sigmoid(x)`.
#[inline]
pub fn sigmoid_derivative(s: f64) -> f64 {
    s * (1.0 - s)
}
