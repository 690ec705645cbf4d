//! Draft pipeline error types.

use std::path::PathBuf;

/// Errors from loading drafts.
///
/// Review outcomes are not errors: a failed save is reported through
/// [`ReviewOutcome`](crate::ReviewOutcome) and leaves the draft in place.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// A proposals file could not be read.
    #[error("failed to read proposals from {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A proposals file is not valid JSON.
    #[error("failed to parse proposals in {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A proposals document is neither an object nor an array.
    #[error("proposals must be a JSON object or array, got {0}")]
    InvalidShape(String),
}

/// Result type for draft operations.
pub type DraftResult<T> = Result<T, DraftError>;
