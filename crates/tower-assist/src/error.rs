//! Assistant error types.

use thiserror::Error;

/// Errors that can occur while asking the assistant for a suggestion.
#[derive(Debug, Error)]
pub enum AssistError {
    /// API key not configured.
    #[error("API key not configured for {provider}")]
    ApiKeyNotConfigured {
        /// Provider name.
        provider: String,
    },

    /// The provider answered with a non-success status.
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The provider's response did not have the expected shape.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for assistant operations.
pub type AssistResult<T> = Result<T, AssistError>;
