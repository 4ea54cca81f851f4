//! Error types for the talent-match library.
//!
//! Only argument problems surface as errors. Degenerate inputs such as an
//! empty cluster, a two-point series or blank feedback text are absorbed by
//! each component and turned into a documented default result.
//!
//! # Examples
//!
//! ```
//! use talent_match::error::{MatchError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(MatchError::invalid_argument("k must be at least 1"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for talent-match operations.
#[derive(Error, Debug)]
pub enum MatchError {
    /// Caller supplied an argument outside the operation's contract
    /// (k out of range, empty training set, mismatched vector lengths).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A model was queried before it was ever trained.
    #[error("Model not trained: {0}")]
    ModelNotTrained(String),

    /// I/O errors while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with MatchError.
pub type Result<T> = std::result::Result<T, MatchError>;

impl MatchError {
    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        MatchError::InvalidArgument(msg.into())
    }

    /// Create a new not-trained error.
    pub fn not_trained<S: Into<String>>(msg: S) -> Self {
        MatchError::ModelNotTrained(msg.into())
    }

    /// Whether this error was caused by the caller's arguments.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, MatchError::InvalidArgument(_))
    }
}
