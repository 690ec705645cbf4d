//! Per-kind normalization and persistence of reviewed form data.
//!
//! Saving a form always runs the same three steps:
//!
//! 1. **Normalize** the form for its kind (stamp ids, member enums).
//! 2. **Sanitize** the result through the kind's allowlist.
//! 3. **Create** the payload in the kind's collection.
//!
//! Failures come back as a [`SaveFailure`] carrying the gateway error and a
//! single operator-facing message.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tower_core::{Destination, EntityKind, Timestamp};
use tower_storage::{GatewayError, PersistenceGateway};
use tracing::{debug, info, warn};

use crate::sanitize::sanitize;

/// Default prefix of assistant-generated stamp ids.
pub const DEFAULT_STAMP_ID_PREFIX: &str = "stp_";

/// Values the dispatcher normalizes against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRules {
    /// Reserved prefix of draft-generated stamp ids.
    pub stamp_id_prefix: String,
    /// Accepted member roles.
    pub member_roles: Vec<String>,
    /// Role substituted for an out-of-range value.
    pub default_role: String,
    /// Accepted member tiers.
    pub member_tiers: Vec<String>,
    /// Tier substituted for an out-of-range value.
    pub default_tier: String,
}

impl Default for DispatchRules {
    fn default() -> Self {
        Self {
            stamp_id_prefix: DEFAULT_STAMP_ID_PREFIX.to_string(),
            member_roles: ["member", "moderator", "admin"].map(String::from).to_vec(),
            default_role: "member".to_string(),
            member_tiers: ["free", "plus", "pro"].map(String::from).to_vec(),
            default_tier: "free".to_string(),
        }
    }
}

/// A record written by a successful save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedRecord {
    /// Kind of the saved record.
    pub kind: EntityKind,
    /// The record as returned by the backend.
    pub record: Value,
    /// Console view where the record can be configured next.
    pub destination: Destination,
}

/// A save that the backend refused or never answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    /// Kind that was being saved.
    pub kind: EntityKind,
    /// Underlying gateway error.
    pub error: GatewayError,
}

impl SaveFailure {
    /// Whether the kind's collection has not been provisioned.
    #[must_use]
    pub fn is_missing_collection(&self) -> bool {
        self.error.is_missing_collection()
    }

    /// The message shown to the operator.
    #[must_use]
    pub fn operator_message(&self) -> String {
        match &self.error {
            GatewayError::MissingCollection { collection, .. } => format!(
                "The `{collection}` table does not exist yet. Provision it in the backend, \
                 then approve this draft again."
            ),
            other => format!("Failed to save {}: {other}", self.kind),
        }
    }
}

impl fmt::Display for SaveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.operator_message())
    }
}

impl std::error::Error for SaveFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Routes reviewed form data through normalization, sanitizing and
/// persistence for its kind.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    rules: DispatchRules,
}

impl Dispatcher {
    /// Create a dispatcher with the given rules.
    #[must_use]
    pub fn new(rules: DispatchRules) -> Self {
        Self { rules }
    }

    /// The rules in effect.
    #[must_use]
    pub fn rules(&self) -> &DispatchRules {
        &self.rules
    }

    /// Apply the kind-specific fixups to a copy of `form`.
    #[must_use]
    pub fn normalize(&self, kind: EntityKind, form: &Map<String, Value>) -> Map<String, Value> {
        let mut form = form.clone();
        match kind {
            EntityKind::Stamp => self.normalize_stamp(&mut form, Timestamp::now()),
            EntityKind::Member => self.normalize_member(&mut form),
            EntityKind::Drop | EntityKind::Broadcast | EntityKind::Promo => {},
        }
        form
    }

    /// Normalize then sanitize; the exact payload `save` would send.
    #[must_use]
    pub fn prepare(&self, kind: EntityKind, form: &Map<String, Value>) -> Map<String, Value> {
        sanitize(&self.normalize(kind, form), kind.allowed_fields())
    }

    /// Persist `form` as a new `kind` record.
    ///
    /// # Errors
    ///
    /// Returns a [`SaveFailure`] when the gateway refuses the record or
    /// cannot be reached.
    pub async fn save(
        &self,
        gateway: &dyn PersistenceGateway,
        kind: EntityKind,
        form: &Map<String, Value>,
    ) -> Result<SavedRecord, SaveFailure> {
        let payload = self.prepare(kind, form);
        let collection = kind.collection();
        debug!(
            gateway = gateway.name(),
            collection,
            fields = payload.len(),
            "Creating record"
        );

        match gateway.create(collection, payload).await {
            Ok(record) => {
                info!(kind = %kind, collection, "Record created");
                Ok(SavedRecord {
                    kind,
                    record,
                    destination: kind.destination(),
                })
            },
            Err(error) => {
                warn!(kind = %kind, collection, error = %error, "Record create failed");
                Err(SaveFailure { kind, error })
            },
        }
    }

    fn is_draft_stamp_id(&self, value: Option<&Value>) -> bool {
        value
            .and_then(Value::as_str)
            .is_some_and(|s| s.starts_with(self.rules.stamp_id_prefix.as_str()))
    }

    fn normalize_stamp(&self, form: &mut Map<String, Value>, now: Timestamp) {
        // A draft-generated id is not a backend primary key.
        if self.is_draft_stamp_id(form.get("id")) {
            if let Some(id) = form.remove("id") {
                form.entry("external_id").or_insert(id);
            }
        }
        if !form.contains_key("external_id") {
            let generated = self.generate_stamp_id(now);
            debug!(external_id = %generated, "Stamp external id generated");
            form.insert("external_id".to_string(), Value::String(generated));
        }
        // New stamps always enter the inventory review queue.
        form.insert("status".to_string(), Value::String("draft".to_string()));
    }

    /// `{prefix}{unix_millis}_{6 hex}`.
    fn generate_stamp_id(&self, now: Timestamp) -> String {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let suffix = nonce.get(..6).unwrap_or(nonce.as_str());
        format!("{}{}_{suffix}", self.rules.stamp_id_prefix, now.unix_millis())
    }

    fn normalize_member(&self, form: &mut Map<String, Value>) {
        coerce_enum(form, "role", &self.rules.member_roles, &self.rules.default_role);
        coerce_enum(form, "tier", &self.rules.member_tiers, &self.rules.default_tier);
    }
}

/// Replace a present `key` whose value is not one of `allowed` with `default`.
fn coerce_enum(form: &mut Map<String, Value>, key: &str, allowed: &[String], default: &str) {
    let Some(value) = form.get_mut(key) else {
        return;
    };
    let in_range = value
        .as_str()
        .is_some_and(|s| allowed.iter().any(|a| a == s));
    if !in_range {
        debug!(field = key, value = %value, default, "Out-of-range value replaced");
        *value = Value::String(default.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::default()
    }

    #[test]
    fn test_stamp_prefixed_id_moves_to_external_id() {
        let form = object(json!({
            "id": "stp_abc",
            "name": "Golden Wing",
            "rarity": "Legendary",
            "price_eggs": 80
        }));
        let payload = dispatcher().prepare(EntityKind::Stamp, &form);

        assert!(!payload.contains_key("id"));
        assert_eq!(payload["external_id"], "stp_abc");
        assert_eq!(payload["status"], "draft");
        assert_eq!(payload["name"], "Golden Wing");
        assert_eq!(payload["price_eggs"], 80);
    }

    #[test]
    fn test_stamp_existing_external_id_wins() {
        let form = object(json!({"id": "stp_new", "external_id": "stp_old"}));
        let payload = dispatcher().prepare(EntityKind::Stamp, &form);
        assert!(!payload.contains_key("id"));
        assert_eq!(payload["external_id"], "stp_old");

        let form = object(json!({"id": "stp_new", "external_id": "legacy-1"}));
        let payload = dispatcher().prepare(EntityKind::Stamp, &form);
        assert!(!payload.contains_key("id"));
        assert_eq!(payload["external_id"], "legacy-1");
    }

    #[test]
    fn test_stamp_external_id_is_synthesized() {
        let mut form = object(json!({"name": "Plain"}));
        let at = Timestamp::now();
        dispatcher().normalize_stamp(&mut form, at);

        let external = form["external_id"].as_str().unwrap();
        let (stem, suffix) = external.rsplit_once('_').unwrap();
        assert_eq!(stem, format!("stp_{}", at.unix_millis()));
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_stamp_ids_generated_in_same_millisecond_differ() {
        let at = Timestamp::now();
        let mut first = Map::new();
        let mut second = Map::new();
        dispatcher().normalize_stamp(&mut first, at);
        dispatcher().normalize_stamp(&mut second, at);
        assert_ne!(first["external_id"], second["external_id"]);
    }

    #[test]
    fn test_stamp_supplied_external_id_is_kept() {
        let form = object(json!({"name": "Golden Wing", "external_id": "legacy-1"}));
        let payload = dispatcher().prepare(EntityKind::Stamp, &form);
        assert_eq!(payload["external_id"], "legacy-1");
    }

    #[test]
    fn test_stamp_backend_id_is_kept() {
        let form = object(json!({"id": "6f1c", "external_id": "legacy-1"}));
        let payload = dispatcher().prepare(EntityKind::Stamp, &form);
        assert_eq!(payload["id"], "6f1c");
        assert_eq!(payload["external_id"], "legacy-1");
    }

    #[test]
    fn test_normalized_stamp_is_stable() {
        let form = object(json!({"id": "stp_abc", "name": "Golden Wing"}));
        let once = dispatcher().normalize(EntityKind::Stamp, &Map::new());
        assert_eq!(dispatcher().prepare(EntityKind::Stamp, &once), once);

        let twice = dispatcher().normalize(EntityKind::Stamp, &form);
        assert_eq!(dispatcher().normalize(EntityKind::Stamp, &twice), twice);
    }

    #[test]
    fn test_stamp_status_is_forced() {
        for status in [json!("live"), json!(null), json!(3)] {
            let form = object(json!({"status": status}));
            let payload = dispatcher().prepare(EntityKind::Stamp, &form);
            assert_eq!(payload["status"], "draft");
        }
    }

    #[test]
    fn test_custom_prefix() {
        let rules = DispatchRules {
            stamp_id_prefix: "draft-".to_string(),
            ..DispatchRules::default()
        };
        let form = object(json!({"id": "draft-9", "name": "x"}));
        let payload = Dispatcher::new(rules).prepare(EntityKind::Stamp, &form);
        assert_eq!(payload["external_id"], "draft-9");
    }

    #[test]
    fn test_member_out_of_range_values_defaulted() {
        let form = object(json!({
            "email": "ops@pidgeypost.app",
            "role": "superuser",
            "tier": 7
        }));
        let payload = dispatcher().prepare(EntityKind::Member, &form);
        assert_eq!(payload["role"], "member");
        assert_eq!(payload["tier"], "free");
    }

    #[test]
    fn test_member_valid_and_absent_values_untouched() {
        let form = object(json!({"email": "a@b.c", "role": "admin"}));
        let payload = dispatcher().prepare(EntityKind::Member, &form);
        assert_eq!(payload["role"], "admin");
        assert!(!payload.contains_key("tier"));
    }

    #[test]
    fn test_other_kinds_only_sanitized() {
        let form = object(json!({"title": "Fall", "id": "x", "status": "live"}));
        let payload = dispatcher().prepare(EntityKind::Drop, &form);
        assert_eq!(Value::Object(payload), json!({"title": "Fall", "status": "live"}));
    }

    #[test]
    fn test_normalize_leaves_input_untouched() {
        let form = object(json!({"id": "stp_abc"}));
        let _ = dispatcher().normalize(EntityKind::Stamp, &form);
        assert_eq!(form["id"], "stp_abc");
    }

    #[test]
    fn test_missing_collection_message() {
        let failure = SaveFailure {
            kind: EntityKind::Promo,
            error: GatewayError::from_error_body(
                "promos",
                &json!({"message": "relation \"promos\" does not exist"}),
            ),
        };
        assert!(failure.is_missing_collection());
        let message = failure.operator_message();
        assert!(message.contains("`promos` table does not exist"));
        assert!(message.contains("approve this draft again"));
    }

    #[test]
    fn test_generic_message() {
        let failure = SaveFailure {
            kind: EntityKind::Drop,
            error: GatewayError::from_error_body("drops", &json!({"message": "duplicate key"})),
        };
        assert_eq!(failure.operator_message(), "Failed to save drop: duplicate key");
        assert_eq!(failure.to_string(), failure.operator_message());
    }

    #[test]
    fn test_empty_error_body_stays_readable() {
        let failure = SaveFailure {
            kind: EntityKind::Promo,
            error: GatewayError::from_error_body("promos", &json!({})),
        };
        let message = failure.operator_message();
        assert!(message.starts_with("Failed to save promo: "));
        assert!(message.contains("{}"));
        assert!(!message.contains("[object Object]"));
    }
}
