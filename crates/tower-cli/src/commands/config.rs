//! `tower config` - inspect the resolved configuration.

use anyhow::{Context, Result};
use tower_config::ResolvedConfig;

use crate::theme::Theme;

/// Print the resolved configuration. Secrets are never shown.
pub(crate) fn show_config(resolved: &ResolvedConfig, format: &str) -> Result<()> {
    let rendered = match format {
        "toml" => resolved.to_toml(),
        "json" => resolved.to_json(),
        other => anyhow::bail!("Unknown format '{other}' (expected toml or json)"),
    }
    .context("Failed to render configuration")?;

    if format == "toml" {
        for file in &resolved.loaded_files {
            println!("{}", Theme::dimmed(&format!("# loaded: {file}")));
        }
    }
    println!("{rendered}");

    let key_source = |field: &str| {
        resolved
            .source_of(field)
            .map_or_else(|| "not set".to_owned(), |layer| format!("set by {layer}"))
    };
    eprintln!(
        "{}",
        Theme::dimmed(&format!(
            "gateway.api_key: {}, assistant.api_key: {}",
            key_source("gateway.api_key"),
            key_source("assistant.api_key"),
        ))
    );
    Ok(())
}
