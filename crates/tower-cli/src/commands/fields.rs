//! `tower fields` - print the field allowlists.

use anyhow::Result;
use tower_core::EntityKind;

use super::parse_kind;
use crate::theme::Theme;

/// Print the allowlist for one kind, or all of them.
pub(crate) fn show_fields(kind: Option<&str>) -> Result<()> {
    let kinds = match kind {
        Some(raw) => vec![parse_kind(raw)?],
        None => EntityKind::ALL.to_vec(),
    };

    for kind in kinds {
        println!(
            "{} {} {}",
            Theme::kind_tag(kind),
            Theme::header(kind.collection()),
            Theme::dimmed(&format!("-> {}", kind.destination())),
        );
        for field in kind.allowed_fields() {
            println!("  {field}");
        }
        println!();
    }
    Ok(())
}
