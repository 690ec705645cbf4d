//! `tower suggest` - one-off assistant suggestion.

use std::sync::Arc;

use anyhow::{Context, Result};
use tower_assist::FormAssistant;

use super::parse_kind;
use crate::theme::Theme;

/// Ask the assistant for `kind` values and print them.
pub(crate) async fn run_suggest(
    assistant: Option<Arc<dyn FormAssistant>>,
    kind: &str,
    context: Option<&str>,
) -> Result<()> {
    let kind = parse_kind(kind)?;
    let Some(assistant) = assistant else {
        anyhow::bail!(
            "The assistant is disabled or has no API key. \
             Set ANTHROPIC_API_KEY or assistant.api_key in the config."
        );
    };

    let suggestion = assistant
        .suggest(kind, context)
        .await
        .context("Assistant request failed")?;

    match suggestion {
        Some(map) => println!(
            "{}",
            serde_json::to_string_pretty(&map).context("Failed to render suggestion")?
        ),
        None => println!("{}", Theme::warning("The assistant had no suggestion")),
    }
    Ok(())
}
