//! Query-to-score pipeline.
//!
//! Free-text queries (or job postings) are parsed into [`SearchFacets`],
//! candidates are scored facet by facet, and the sub-scores are combined
//! into a single [`MatchResult`] with human-readable reasons.

pub mod features;
pub mod query;
pub mod records;
pub mod scoring;

pub use features::CandidateFeatures;
pub use query::{Availability, ExperienceTier, QueryAnalyzer, SearchFacets};
pub use records::{Candidate, JobPosting};
pub use scoring::{CompositeScorer, FacetScores, MatchResult, MatchWeights, ScoringConfig};
