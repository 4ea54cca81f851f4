//! Random sources for the stochastic components.
//!
//! Every component that draws random numbers takes an optional seed. A seed
//! gives a reproducible `StdRng`; without one the generator is seeded from
//! the thread-local entropy source.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Build a `StdRng`, reproducible when `seed` is given.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Stable CRC32 fingerprint of a string.
///
/// Used wherever a per-input seed is derived from text (candidate ids,
/// normalised queries) so the value does not change between processes.
pub fn fingerprint(text: &str) -> u32 {
    crc32fast::hash(text.as_bytes())
}

/// Combine two fingerprints into a single 64-bit seed.
pub fn combine_seed(a: u32, b: u32) -> u64 {
    ((a as u64) << 32) | b as u64
}
