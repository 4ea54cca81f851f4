//! Feature extraction from candidate records.
//!
//! Every model in the engine sees candidates through the same five-slot
//! layout, so a vector built at training time lines up with one built at
//! prediction time.
//!
//! | slot | feature              | ceiling |
//! |------|----------------------|---------|
//! | 0    | skill count          | 20      |
//! | 1    | years of experience  | 30      |
//! | 2    | rating               | 5       |
//! | 3    | completed projects   | 100     |
//! | 4    | certifications       | 10      |
//!
//! Each raw value is divided by its ceiling and clamped into `[0, 1]`.

use crate::matching::records::Candidate;
use crate::ml::FeatureVector;
use crate::util::numeric::clamp_score;

/// Feature extractor for candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateFeatures;

impl CandidateFeatures {
    /// Feature names in slot order.
    pub const FEATURE_NAMES: [&'static str; 5] = [
        "skill_count",
        "years_experience",
        "rating",
        "completed_projects",
        "certifications",
    ];

    /// Normalisation ceilings in slot order.
    pub const CEILINGS: [f64; 5] = [20.0, 30.0, 5.0, 100.0, 10.0];

    /// Length of every extracted vector.
    pub const DIMENSION: usize = Self::FEATURE_NAMES.len();

    /// Raw, unnormalised feature values.
    pub fn raw(candidate: &Candidate) -> [f64; 5] {
        [
            candidate.skills.len() as f64,
            candidate.years_experience,
            candidate.rating,
            candidate.completed_projects as f64,
            candidate.certifications as f64,
        ]
    }

    /// Normalised feature vector in `[0, 1]^5`.
    pub fn extract(candidate: &Candidate) -> FeatureVector {
        Self::raw(candidate)
            .iter()
            .zip(Self::CEILINGS.iter())
            .map(|(value, ceiling)| clamp_score(value / ceiling, 0.0, 1.0))
            .collect()
    }

    /// Extract vectors for a batch of candidates, in input order.
    pub fn extract_all(candidates: &[Candidate]) -> Vec<FeatureVector> {
        candidates.iter().map(Self::extract).collect()
    }
}
