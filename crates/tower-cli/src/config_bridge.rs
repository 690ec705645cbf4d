//! Bridge from `tower_config::Config` to domain types.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_assist::{ClaudeAssistant, ClaudeSettings, FormAssistant};
use tower_config::{AssistantConfig, Config, DraftsSection, GatewayConfig};
use tower_core::EntityKind;
use tower_drafts::DispatchRules;
use tower_storage::{MemoryGateway, PersistenceGateway, RestGateway, RestGatewayConfig};
use tower_telemetry::LogConfig;

/// Build the logging configuration, falling back to defaults on bad values.
pub(crate) fn to_log_config(config: &Config) -> LogConfig {
    LogConfig::try_from(&config.logging).unwrap_or_else(|e| {
        eprintln!("Invalid [logging] section, using defaults: {e}");
        LogConfig::default()
    })
}

/// Dispatcher rules from the `[drafts]` section.
pub(crate) fn to_dispatch_rules(drafts: &DraftsSection) -> DispatchRules {
    DispatchRules {
        stamp_id_prefix: drafts.stamp_id_prefix.clone(),
        member_roles: drafts.member.roles.clone(),
        default_role: drafts.member.default_role.clone(),
        member_tiers: drafts.member.tiers.clone(),
        default_tier: drafts.member.default_tier.clone(),
    }
}

/// The gateway for a review session.
///
/// Dry runs use an in-memory backend with every collection provisioned.
pub(crate) fn to_gateway(
    gateway: &GatewayConfig,
    dry_run: bool,
) -> Result<Arc<dyn PersistenceGateway>> {
    if dry_run {
        let collections = EntityKind::ALL.iter().map(|k| k.collection());
        return Ok(Arc::new(MemoryGateway::with_collections(collections)));
    }

    let (Some(url), Some(api_key)) = (&gateway.url, &gateway.api_key) else {
        anyhow::bail!(
            "No backend configured. Set gateway.url and gateway.api_key \
             (or TOWER_GATEWAY_URL / TOWER_GATEWAY_KEY), or pass --dry-run."
        );
    };

    let rest = RestGateway::new(RestGatewayConfig {
        url: url.clone(),
        api_key: api_key.clone(),
        timeout: Duration::from_secs(gateway.timeout_secs),
        schema: gateway.schema.clone(),
    })
    .context("Failed to build backend gateway")?;
    Ok(Arc::new(rest))
}

/// The assistant, when enabled and keyed.
pub(crate) fn to_assistant(
    assistant: &AssistantConfig,
) -> Result<Option<Arc<dyn FormAssistant>>> {
    if !assistant.enabled {
        return Ok(None);
    }
    let Some(api_key) = assistant.api_key.as_deref().filter(|k| !k.is_empty()) else {
        tracing::debug!("Assistant enabled but no API key configured");
        return Ok(None);
    };

    let mut settings = ClaudeSettings::new(api_key, assistant.model.clone())
        .max_tokens(assistant.max_tokens)
        .temperature(assistant.temperature);
    if let Some(url) = &assistant.api_url {
        settings = settings.api_url(url.clone());
    }
    let claude = ClaudeAssistant::new(settings).context("Failed to build assistant client")?;
    Ok(Some(Arc::new(claude)))
}
