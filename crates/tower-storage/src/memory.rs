//! In-memory gateway.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{Listing, PersistenceGateway, validate_collection};

type Collections = HashMap<String, Vec<Map<String, Value>>>;

/// Gateway that keeps collections in process memory.
///
/// Only provisioned collections accept writes; anything else fails the way a
/// real database does when the table is missing. Records get an `id` (UUID)
/// and `created_at` when the payload does not carry them.
///
/// # Example
///
/// ```
/// use tower_storage::MemoryGateway;
///
/// let gateway = MemoryGateway::with_collections(["stamps", "drops"]);
/// assert!(gateway.is_provisioned("stamps"));
/// assert!(!gateway.is_provisioned("promos"));
/// ```
pub struct MemoryGateway {
    collections: RwLock<Collections>,
}

impl MemoryGateway {
    /// Create a gateway with no collections.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Create a gateway with the given collections provisioned.
    #[must_use]
    pub fn with_collections<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let gateway = Self::new();
        for name in collections {
            gateway.provision(name);
        }
        gateway
    }

    /// Provision an empty collection. No-op if it already exists.
    pub fn provision(&self, collection: impl Into<String>) {
        self.write().entry(collection.into()).or_default();
    }

    /// Whether a collection has been provisioned.
    #[must_use]
    pub fn is_provisioned(&self, collection: &str) -> bool {
        self.read().contains_key(collection)
    }

    /// Snapshot of the records stored in a collection.
    #[must_use]
    pub fn records(&self, collection: &str) -> Vec<Map<String, Value>> {
        self.read().get(collection).cloned().unwrap_or_default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.collections.read().unwrap_or_else(|e| {
            tracing::warn!("MemoryGateway read lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.collections.write().unwrap_or_else(|e| {
            tracing::warn!("MemoryGateway lock poisoned, recovering");
            e.into_inner()
        })
    }

    fn missing(collection: &str) -> GatewayError {
        GatewayError::from_error_body(
            collection,
            &json!({
                "code": "42P01",
                "message": format!("relation \"{collection}\" does not exist"),
            }),
        )
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read();
        let mut names: Vec<&String> = guard.keys().collect();
        names.sort();
        f.debug_struct("MemoryGateway")
            .field("collections", &names)
            .finish()
    }
}

fn record_id(record: &Map<String, Value>) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create(&self, collection: &str, payload: Map<String, Value>) -> GatewayResult<Value> {
        validate_collection(collection)?;
        let mut store = self.write();
        let rows = store
            .get_mut(collection)
            .ok_or_else(|| Self::missing(collection))?;

        let mut record = payload;
        if record_id(&record).is_none() {
            record.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
        }
        if !record.contains_key("created_at") {
            record.insert(
                "created_at".into(),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }

        tracing::debug!(collection, rows = rows.len(), "memory gateway insert");
        rows.push(record.clone());
        Ok(Value::Object(record))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        payload: Map<String, Value>,
    ) -> GatewayResult<Value> {
        validate_collection(collection)?;
        let mut store = self.write();
        let rows = store
            .get_mut(collection)
            .ok_or_else(|| Self::missing(collection))?;

        let record = rows
            .iter_mut()
            .find(|r| record_id(r).as_deref() == Some(id))
            .ok_or_else(|| GatewayError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        for (key, value) in payload {
            // The primary key is immutable.
            if key != "id" {
                record.insert(key, value);
            }
        }
        Ok(Value::Object(record.clone()))
    }

    async fn list(&self, collection: &str) -> GatewayResult<Listing> {
        validate_collection(collection)?;
        let store = self.read();
        let rows = store
            .get(collection)
            .ok_or_else(|| Self::missing(collection))?;
        Ok(Listing {
            rows: rows.iter().cloned().map(Value::Object).collect(),
            count: rows.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_create_generates_id_and_timestamp() {
        let gateway = MemoryGateway::with_collections(["promos"]);
        let record = gateway
            .create("promos", payload(json!({"name": "Fall Sale"})))
            .await
            .unwrap();
        assert!(record["id"].is_string());
        assert!(record["created_at"].is_string());
        assert_eq!(gateway.records("promos").len(), 1);
    }

    #[tokio::test]
    async fn test_create_keeps_supplied_id() {
        let gateway = MemoryGateway::with_collections(["members"]);
        let record = gateway
            .create("members", payload(json!({"id": "m-1", "email": "a@b.c"})))
            .await
            .unwrap();
        assert_eq!(record["id"], "m-1");
    }

    #[tokio::test]
    async fn test_create_missing_collection() {
        let gateway = MemoryGateway::new();
        let err = gateway
            .create("promos", payload(json!({"name": "x"})))
            .await
            .unwrap_err();
        assert!(err.is_missing_collection());
        assert!(err.to_string().contains("relation \"promos\" does not exist"));
    }

    #[tokio::test]
    async fn test_invalid_collection_name() {
        let gateway = MemoryGateway::new();
        let err = gateway.list("promos; drop").await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCollection(_)));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let gateway = MemoryGateway::with_collections(["drops"]);
        gateway
            .create("drops", payload(json!({"id": "d-1", "title": "Spring", "status": "draft"})))
            .await
            .unwrap();

        let updated = gateway
            .update("drops", "d-1", payload(json!({"status": "live", "id": "other"})))
            .await
            .unwrap();
        assert_eq!(updated["status"], "live");
        assert_eq!(updated["title"], "Spring");
        assert_eq!(updated["id"], "d-1");
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let gateway = MemoryGateway::with_collections(["drops"]);
        let err = gateway
            .update("drops", "nope", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list() {
        let gateway = MemoryGateway::with_collections(["broadcasts"]);
        for name in ["a", "b", "c"] {
            gateway
                .create("broadcasts", payload(json!({"name": name})))
                .await
                .unwrap();
        }
        let listing = gateway.list("broadcasts").await.unwrap();
        assert_eq!(listing.count, 3);
        assert_eq!(listing.rows[2]["name"], "c");
    }

    #[test]
    fn test_debug_lists_collections() {
        let gateway = MemoryGateway::with_collections(["stamps", "drops"]);
        let debug = format!("{gateway:?}");
        assert!(debug.contains("MemoryGateway"));
        assert!(debug.contains("\"drops\", \"stamps\""));
    }
}
