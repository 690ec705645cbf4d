//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while installing logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The logging configuration is invalid (bad level, directive or format).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A global subscriber could not be installed.
    #[error("Initialization error: {0}")]
    InitError(String),

    /// IO error (e.g. creating the log directory).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
