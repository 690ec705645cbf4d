//! Configuration types.
//!
//! Every struct implements [`Default`] with the same values as the embedded
//! `defaults.toml`, so a bare `[section]` header produces a working
//! configuration.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Persistence gateway endpoint and credentials.
    pub gateway: GatewayConfig,
    /// Drafting assistant model settings.
    pub assistant: AssistantConfig,
    /// Draft normalization rules.
    pub drafts: DraftsSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// GatewayConfig
// ---------------------------------------------------------------------------

/// Persistence gateway settings.
///
/// When `url` is unset the console has nowhere to persist to; the CLI then
/// requires `--dry-run`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Backend project URL.
    pub url: Option<String>,
    /// Service key. Prefer `TOWER_GATEWAY_KEY` over storing this in a file.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Postgres schema to address, when not the default one.
    pub schema: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url)
            .field("has_api_key", &self.api_key.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .field("schema", &self.schema)
            .finish()
    }
}

impl Serialize for GatewayConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GatewayConfig", 3)?;
        state.serialize_field("url", &self.url)?;
        // api_key is intentionally omitted.
        state.serialize_field("timeout_secs", &self.timeout_secs)?;
        state.serialize_field("schema", &self.schema)?;
        state.end()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_secs: 30,
            schema: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AssistantConfig
// ---------------------------------------------------------------------------

/// Drafting assistant settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Whether auto-fill suggestions are offered during review.
    pub enabled: bool,
    /// Model name sent to the provider API.
    pub model: String,
    /// API key. Prefer `ANTHROPIC_API_KEY` over storing this in a file.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Messages endpoint override.
    #[serde(skip_serializing)]
    pub api_url: Option<String>,
    /// Maximum tokens to request per suggestion.
    pub max_tokens: usize,
    /// Sampling temperature.
    pub temperature: f64,
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("enabled", &self.enabled)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("has_api_url", &self.api_url.is_some())
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Serialize for AssistantConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AssistantConfig", 4)?;
        state.serialize_field("enabled", &self.enabled)?;
        state.serialize_field("model", &self.model)?;
        // api_key and api_url are intentionally omitted.
        state.serialize_field("max_tokens", &self.max_tokens)?;
        state.serialize_field("temperature", &self.temperature)?;
        state.end()
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "claude-sonnet-4-20250514".to_owned(),
            api_key: None,
            api_url: None,
            max_tokens: 2048,
            temperature: 0.4,
        }
    }
}

// ---------------------------------------------------------------------------
// DraftsSection
// ---------------------------------------------------------------------------

/// Rules applied to drafts before they are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftsSection {
    /// Prefix the assistant uses for provisional stamp ids (e.g. `stp_`).
    pub stamp_id_prefix: String,
    /// Accepted member roles and tiers.
    pub member: MemberSection,
}

impl Default for DraftsSection {
    fn default() -> Self {
        Self {
            stamp_id_prefix: "stp_".to_owned(),
            member: MemberSection::default(),
        }
    }
}

/// Member enumerations and the defaults used for out-of-range values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberSection {
    /// Accepted `role` values.
    pub roles: Vec<String>,
    /// Role used when a draft proposes one outside `roles`.
    pub default_role: String,
    /// Accepted `tier` values.
    pub tiers: Vec<String>,
    /// Tier used when a draft proposes one outside `tiers`.
    pub default_tier: String,
}

impl Default for MemberSection {
    fn default() -> Self {
        Self {
            roles: vec!["member".to_owned(), "moderator".to_owned(), "admin".to_owned()],
            default_role: "member".to_owned(),
            tiers: vec!["free".to_owned(), "plus".to_owned(), "pro".to_owned()],
            default_tier: "free".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["tower_storage=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
