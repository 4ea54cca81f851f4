//! Shared numeric and randomness helpers used across talent-match components.

pub mod numeric;
pub mod rng;
