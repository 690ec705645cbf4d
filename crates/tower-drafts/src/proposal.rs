//! Turning assistant output into drafts.
//!
//! The assistant emits one proposal object, or an array of them:
//!
//! ```json
//! { "type": "promo", "summary": "Fall promo", "data": { "code": "FALL10" } }
//! ```
//!
//! `id` and `created_at` are optional. Entries that cannot become a draft
//! are logged and skipped; they never reach the store.

use serde_json::{Map, Value};
use std::path::Path;
use tower_core::{EntityKind, Timestamp};
use tracing::warn;

use crate::draft::{Draft, DraftId};
use crate::error::{DraftError, DraftResult};

/// Parse proposals from a JSON value.
///
/// Entries with an unknown `type`, a non-object `data` or a non-object shape
/// are skipped with a warning. A top-level value that is neither an object
/// nor an array yields no drafts.
#[must_use]
pub fn parse_proposals(value: &Value) -> Vec<Draft> {
    match value {
        Value::Array(entries) => entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| parse_entry(index, entry))
            .collect(),
        Value::Object(_) => parse_entry(0, value).into_iter().collect(),
        other => {
            warn!(kind = json_type(other), "Ignoring proposals that are not an object or array");
            Vec::new()
        },
    }
}

/// Read and parse a proposals file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not JSON, or is neither
/// an object nor an array.
pub fn load_proposals(path: &Path) -> DraftResult<Vec<Draft>> {
    let content = std::fs::read_to_string(path).map_err(|source| DraftError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| DraftError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if !value.is_object() && !value.is_array() {
        return Err(DraftError::InvalidShape(json_type(&value).to_string()));
    }
    Ok(parse_proposals(&value))
}

fn parse_entry(index: usize, entry: &Value) -> Option<Draft> {
    let Value::Object(fields) = entry else {
        warn!(index, kind = json_type(entry), "Skipping proposal that is not an object");
        return None;
    };

    let kind = match fields.get("type").and_then(Value::as_str) {
        Some(tag) => match tag.parse::<EntityKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(index, error = %e, "Skipping proposal");
                return None;
            },
        },
        None => {
            warn!(index, "Skipping proposal without a type");
            return None;
        },
    };

    let data = match fields.get("data") {
        None => Map::new(),
        Some(Value::Object(data)) => data.clone(),
        Some(other) => {
            warn!(index, kind = %kind, data = json_type(other), "Skipping proposal with non-object data");
            return None;
        },
    };

    let summary = fields
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(kind.label());

    let id = fields
        .get("id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map_or_else(DraftId::new, DraftId::from);

    let created_at = fields
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(Timestamp::parse_rfc3339)
        .unwrap_or_else(Timestamp::now);

    Some(Draft {
        id,
        kind,
        summary: summary.to_string(),
        data,
        created_at,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
