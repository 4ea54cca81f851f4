//! # talent-match
//!
//! Candidate matching and scoring engine.
//!
//! ## Features
//!
//! - Free-text query and job posting analysis into structured facets
//! - Composite facet scoring with reproducible, explained results
//! - K-means cohorts, bootstrap tree ensembles and a feed-forward scorer
//! - Lexicon sentiment over client feedback
//! - Trend forecasting and epsilon-greedy strategy selection
//!
//! ```
//! use talent_match::prelude::*;
//!
//! let engine = MatchEngine::new(EngineConfig::default()).unwrap();
//! let candidates = vec![
//!     Candidate::new("c1", "Ada")
//!         .with_skills(["Rust", "PostgreSQL"])
//!         .with_location("Berlin"),
//! ];
//! let results = engine.search("rust developer in berlin", &candidates, Some(10));
//! assert_eq!(results[0].candidate_id, "c1");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod matching;
pub mod ml;
pub mod util;

pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{MatchEngine, SuccessPrediction};
    pub use crate::error::{MatchError, Result};
    pub use crate::matching::{
        Availability, Candidate, CandidateFeatures, CompositeScorer, ExperienceTier, FacetScores,
        JobPosting, MatchResult, MatchWeights, QueryAnalyzer, ScoringConfig, SearchFacets,
    };
    pub use crate::ml::FeatureVector;
    pub use crate::ml::sentiment::{FeedbackSummary, Sentiment, SentimentResult};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
