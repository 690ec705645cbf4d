//! `tower preview` - show what each draft would persist.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tower_drafts::{Dispatcher, load_proposals};

use crate::theme::Theme;

/// Print the prepared payload of every draft in `file`.
pub(crate) fn run_preview(dispatcher: &Dispatcher, file: &Path) -> Result<()> {
    let drafts = load_proposals(file)
        .with_context(|| format!("Failed to load proposals from {}", file.display()))?;

    if drafts.is_empty() {
        println!("{}", Theme::warning("No usable proposals in file"));
        return Ok(());
    }

    for draft in &drafts {
        let payload = dispatcher.prepare(draft.kind, &draft.data);
        println!("{}", Theme::separator());
        println!("{} {}", Theme::kind_tag(draft.kind), Theme::header(&draft.summary));
        println!(
            "{}",
            Theme::dimmed(&format!("{} -> {}", draft.id, draft.kind.collection()))
        );
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("Failed to render payload")?
        );

        if generated_external_id(&draft.data, &payload) {
            println!(
                "{}",
                Theme::dimmed("external_id is generated; review assigns the final value")
            );
        }

        let dropped = super::review::dropped_fields(draft.kind, &draft.data);
        if !dropped.is_empty() {
            println!(
                "{}",
                Theme::dimmed(&format!("not persisted: {}", dropped.join(", ")))
            );
        }
    }
    Ok(())
}

/// Whether the payload's `external_id` was made up rather than taken from
/// the draft.
fn generated_external_id(data: &Map<String, Value>, payload: &Map<String, Value>) -> bool {
    payload.get("external_id").is_some_and(|external| {
        data.get("external_id") != Some(external) && data.get("id") != Some(external)
    })
}
