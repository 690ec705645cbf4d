#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Configuration for Control Tower.
//!
//! A single [`Config`] type covers the persistence gateway, the drafting
//! assistant, draft normalization rules and logging.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tower_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("assistant model: {}", resolved.config.assistant.model);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit file** (`tower --config path.toml`)
//! 2. **User** (`~/.tower/config.toml`, or `$TOWER_HOME/config.toml`)
//! 3. **Environment variables** (`TOWER_*`, `ANTHROPIC_API_KEY`) - only for
//!    fields no file has set
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! # Design
//!
//! This crate depends on no other tower crate. The CLI converts config
//! sections into gateway and assistant settings at startup.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered TOML merging.
pub mod merge;
/// Resolved configuration display.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use show::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// `explicit` is an additional file that overrides the user layer.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, None)
    }

    /// Load configuration with an explicit tower home directory.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load_with_home(
        explicit: Option<&std::path::Path>,
        tower_home: &std::path::Path,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, Some(tower_home))
    }

    /// Load configuration from a single file (no layering, no env).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
