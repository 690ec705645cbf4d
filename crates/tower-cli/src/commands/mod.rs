//! CLI commands.

pub(crate) mod config;
pub(crate) mod fields;
pub(crate) mod preview;
pub(crate) mod review;
pub(crate) mod suggest;

use anyhow::Result;
use tower_core::EntityKind;

/// Parse a record kind argument, listing the valid kinds on error.
pub(crate) fn parse_kind(raw: &str) -> Result<EntityKind> {
    raw.parse::<EntityKind>().map_err(|e| {
        let valid: Vec<&str> = EntityKind::ALL.iter().map(|k| k.as_str()).collect();
        anyhow::anyhow!("{e} (expected one of: {})", valid.join(", "))
    })
}
