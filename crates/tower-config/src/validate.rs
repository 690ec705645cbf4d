//! Post-merge configuration validation.
//!
//! Checks that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges and that cross-field invariants hold.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Longest per-request gateway timeout, in seconds.
const MAX_TIMEOUT_SECS: u64 = 300;

/// Largest completion the assistant may request.
const MAX_ASSISTANT_TOKENS: usize = 200_000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_gateway(config)?;
    validate_assistant(config)?;
    validate_drafts(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_gateway(config: &Config) -> ConfigResult<()> {
    let g = &config.gateway;

    if let Some(url) = &g.url {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(invalid(
                "gateway.url",
                format!("'{url}' must start with http:// or https://"),
            ));
        }
    }

    if g.timeout_secs == 0 || g.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(invalid(
            "gateway.timeout_secs",
            format!("timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}"),
        ));
    }

    if g.schema.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return Err(invalid("gateway.schema", "schema must not be blank when set"));
    }

    Ok(())
}

fn validate_assistant(config: &Config) -> ConfigResult<()> {
    let a = &config.assistant;

    if a.model.trim().is_empty() {
        return Err(invalid("assistant.model", "model must not be empty"));
    }

    if !(0.0..=1.0).contains(&a.temperature) {
        return Err(invalid(
            "assistant.temperature",
            format!(
                "temperature {} is out of range; must be between 0.0 and 1.0",
                a.temperature
            ),
        ));
    }

    if a.max_tokens == 0 || a.max_tokens > MAX_ASSISTANT_TOKENS {
        return Err(invalid(
            "assistant.max_tokens",
            format!("max_tokens must be between 1 and {MAX_ASSISTANT_TOKENS}"),
        ));
    }

    Ok(())
}

fn validate_drafts(config: &Config) -> ConfigResult<()> {
    let d = &config.drafts;

    let prefix_ok = !d.stamp_id_prefix.is_empty()
        && d
            .stamp_id_prefix
            .chars()
            .all(|c| c.is_ascii() && !c.is_ascii_whitespace() && !c.is_ascii_control());
    if !prefix_ok {
        return Err(invalid(
            "drafts.stamp_id_prefix",
            "prefix must be non-empty printable ASCII without whitespace",
        ));
    }

    let m = &d.member;
    if !m.roles.contains(&m.default_role) {
        return Err(invalid(
            "drafts.member.default_role",
            format!("'{}' is not one of {:?}", m.default_role, m.roles),
        ));
    }
    if !m.tiers.contains(&m.default_tier) {
        return Err(invalid(
            "drafts.member.default_tier",
            format!("'{}' is not one of {:?}", m.default_tier, m.tiers),
        ));
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !LOG_LEVELS.contains(&l.level.to_ascii_lowercase().as_str()) {
        return Err(invalid(
            "logging.level",
            format!("unknown level '{}'; expected one of {LOG_LEVELS:?}", l.level),
        ));
    }

    if !LOG_FORMATS.contains(&l.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!("unknown format '{}'; expected one of {LOG_FORMATS:?}", l.format),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_gateway_url_scheme() {
        let mut config = Config::default();
        config.gateway.url = Some("abc.example.co".to_owned());
        assert_eq!(field_of(validate(&config)), "gateway.url");
    }

    #[test]
    fn test_gateway_timeout_bounds() {
        let mut config = Config::default();
        config.gateway.timeout_secs = 301;
        assert_eq!(field_of(validate(&config)), "gateway.timeout_secs");
    }

    #[test]
    fn test_assistant_temperature() {
        let mut config = Config::default();
        config.assistant.temperature = 1.5;
        assert_eq!(field_of(validate(&config)), "assistant.temperature");
    }

    #[test]
    fn test_stamp_prefix() {
        let mut config = Config::default();
        config.drafts.stamp_id_prefix = "stp _".to_owned();
        assert_eq!(field_of(validate(&config)), "drafts.stamp_id_prefix");
        config.drafts.stamp_id_prefix = String::new();
        assert_eq!(field_of(validate(&config)), "drafts.stamp_id_prefix");
    }

    #[test]
    fn test_member_defaults_must_be_listed() {
        let mut config = Config::default();
        config.drafts.member.default_role = "owner".to_owned();
        assert_eq!(field_of(validate(&config)), "drafts.member.default_role");

        let mut config = Config::default();
        config.drafts.member.tiers = vec!["gold".to_owned()];
        assert_eq!(field_of(validate(&config)), "drafts.member.default_tier");
    }

    #[test]
    fn test_logging_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }
}
