//! Test fixtures for common draft shapes.

use serde_json::{Map, Value, json};
use tower_core::EntityKind;
use tower_drafts::Draft;

/// Convert a `json!` object literal into form data.
///
/// # Panics
///
/// Panics if `value` is not a JSON object.
#[must_use]
pub fn form(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture form must be a JSON object, got {other}"),
    }
}

/// Create a draft of `kind` with the given data.
#[must_use]
pub fn test_draft(kind: EntityKind, data: Value) -> Draft {
    Draft::new(kind, format!("Test {}", kind.label()), form(data))
}

/// Every collection name, for provisioning a full backend.
#[must_use]
pub fn all_collections() -> Vec<&'static str> {
    EntityKind::ALL.iter().map(|k| k.collection()).collect()
}

/// A promo form carrying fields the promos table does not have.
#[must_use]
pub fn promo_form() -> Map<String, Value> {
    form(json!({
        "name": "Fall Flash Sale",
        "code": "FALL10",
        "id": "ai-generated-1",
        "created_at": "2026-09-30T09:00:00Z"
    }))
}

/// A stamp form using an assistant-generated id.
#[must_use]
pub fn stamp_form() -> Map<String, Value> {
    form(json!({
        "id": "stp_abc",
        "name": "Golden Wing",
        "rarity": "Legendary",
        "price_eggs": 80
    }))
}

/// A member form with out-of-range role and tier.
#[must_use]
pub fn member_form() -> Map<String, Value> {
    form(json!({
        "email": "ops@pidgeypost.app",
        "full_name": "Pat Ops",
        "role": "owner",
        "tier": "platinum",
        "password": "hunter2"
    }))
}
