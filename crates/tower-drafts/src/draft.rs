//! Draft records proposed by the assistant.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tower_core::{EntityKind, Timestamp};
use uuid::Uuid;

/// Unique identifier for a draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(String);

impl DraftId {
    /// Generate a fresh id (UUID v4 text).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DraftId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DraftId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// An AI-authored proposal for a record, pending operator review.
///
/// `data` is untrusted: it may carry extra, missing or misnamed fields and
/// is only ever persisted after normalization and sanitizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Draft identifier.
    pub id: DraftId,
    /// Kind of record proposed.
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Short human-readable description.
    pub summary: String,
    /// Proposed field values.
    pub data: Map<String, Value>,
    /// When the draft was proposed.
    pub created_at: Timestamp,
}

impl Draft {
    /// Create a draft with a fresh id, stamped now.
    #[must_use]
    pub fn new(kind: EntityKind, summary: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: DraftId::new(),
            kind,
            summary: summary.into(),
            data,
            created_at: Timestamp::now(),
        }
    }

    /// Replace the id (used when ingesting drafts that already carry one).
    #[must_use]
    pub fn with_id(mut self, id: impl Into<DraftId>) -> Self {
        self.id = id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(DraftId::new(), DraftId::new());
    }

    #[test]
    fn test_serializes_kind_as_type() {
        let draft = Draft::new(EntityKind::Promo, "Fall promo", Map::new()).with_id("d-1");
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["type"], "promo");
        assert_eq!(value["id"], "d-1");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_deserialize() {
        let draft: Draft = serde_json::from_value(json!({
            "id": "d-2",
            "type": "stamp",
            "summary": "Golden Wing",
            "data": {"name": "Golden Wing"},
            "created_at": "2026-01-05T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(draft.kind, EntityKind::Stamp);
        assert_eq!(draft.id.as_str(), "d-2");
        assert_eq!(draft.data["name"], "Golden Wing");
    }
}
