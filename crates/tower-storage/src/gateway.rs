//! The persistence gateway trait.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{GatewayError, GatewayResult};

/// A page of rows read from a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Listing {
    /// Rows as returned by the backend.
    pub rows: Vec<Value>,
    /// Total number of rows in the collection (may exceed `rows.len()`).
    pub count: usize,
}

/// Generic create/update/list access to backend collections.
///
/// Implementations must not retry on their own; a failure is reported once
/// and the operator decides whether to try again.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Short name used in logs (e.g. `"memory"`, `"rest"`).
    fn name(&self) -> &str;

    /// Insert a record and return it as stored (with backend-generated fields).
    async fn create(&self, collection: &str, payload: Map<String, Value>) -> GatewayResult<Value>;

    /// Merge `payload` into the record with the given id and return the result.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        payload: Map<String, Value>,
    ) -> GatewayResult<Value>;

    /// Read the rows of a collection.
    async fn list(&self, collection: &str) -> GatewayResult<Listing>;
}

/// Check that a collection name is a plain lowercase identifier.
///
/// Collection names end up in URL paths and SQL identifiers.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidCollection`] for empty names or names with
/// characters outside `[a-z0-9_]`.
pub fn validate_collection(collection: &str) -> GatewayResult<()> {
    let valid = !collection.is_empty()
        && collection
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(GatewayError::InvalidCollection(collection.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_collection() {
        assert!(validate_collection("promos").is_ok());
        assert!(validate_collection("stamp_editions2").is_ok());
        assert!(validate_collection("").is_err());
        assert!(validate_collection("promos?select=*").is_err());
        assert!(validate_collection("../members").is_err());
        assert!(validate_collection("Promos").is_err());
    }
}
