use serde::Serialize;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::FieldSources;
use crate::types::Config;

/// A loaded configuration together with where each value came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The merged, validated configuration.
    pub config: Config,
    /// Dotted field path → layer that set it.
    pub field_sources: FieldSources,
    /// Files that contributed, lowest precedence first.
    pub loaded_files: Vec<String>,
}

impl ResolvedConfig {
    /// Render the configuration as TOML. Secrets are never included.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SerializeError`] if rendering fails.
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(&self.config).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Render the configuration as JSON. Secrets are never included.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SerializeError`] if rendering fails.
    pub fn to_json(&self) -> ConfigResult<String> {
        #[derive(Serialize)]
        struct View<'a> {
            config: &'a Config,
            loaded_files: &'a [String],
        }
        serde_json::to_string_pretty(&View {
            config: &self.config,
            loaded_files: &self.loaded_files,
        })
        .map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Source layer for a dotted field path, as display text.
    #[must_use]
    pub fn source_of(&self, field: &str) -> Option<String> {
        self.field_sources.get(field).map(ToString::to_string)
    }
}
