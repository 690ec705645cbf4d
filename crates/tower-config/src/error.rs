/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// File that failed.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A config file (or the merged tree) is not valid TOML for [`Config`](crate::Config).
    #[error("failed to parse config {path}: {source}")]
    ParseError {
        /// File that failed, or a `<...>` placeholder for synthetic sources.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A value is out of range or inconsistent with another value.
    #[error("invalid config value for {field}: {message}")]
    ValidationError {
        /// Dotted field path (e.g. `gateway.timeout_secs`).
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The resolved config could not be rendered.
    #[error("failed to serialize config: {0}")]
    SerializeError(String),

    /// The user's home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
