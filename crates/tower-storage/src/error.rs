//! Gateway error types.

use serde_json::Value;

/// Postgres `undefined_table`.
const PG_UNDEFINED_TABLE: &str = "42P01";
/// PostgREST "table not found in schema cache".
const PGRST_TABLE_NOT_FOUND: &str = "PGRST205";

/// Errors from persistence gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The target collection (table) has not been provisioned.
    #[error("collection {collection} does not exist: {message}")]
    MissingCollection {
        /// Collection that was addressed.
        collection: String,
        /// Backend message, verbatim.
        message: String,
    },

    /// The backend rejected the operation with a readable message.
    #[error("{message}")]
    Backend {
        /// Backend message, verbatim.
        message: String,
        /// Backend error code, when one was supplied.
        code: Option<String>,
    },

    /// The backend returned an error without a message field.
    ///
    /// `raw` is the JSON text of whatever the backend sent.
    #[error("unrecognized backend error: {raw}")]
    Unrecognized {
        /// JSON serialization of the error body.
        raw: String,
    },

    /// No record with the given id exists in the collection.
    #[error("record not found: {collection}/{id}")]
    NotFound {
        /// Collection that was searched.
        collection: String,
        /// Record id that was not found.
        id: String,
    },

    /// The collection name cannot be addressed.
    #[error("invalid collection name: {0}")]
    InvalidCollection(String),

    /// The request never produced a backend answer (network, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The gateway itself is misconfigured.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Classify a raw backend error body.
    ///
    /// The body's shape is not trusted: a `message` string is used when
    /// present, otherwise the body's JSON text is kept so nothing unreadable
    /// reaches the operator. Undefined-table errors become
    /// [`GatewayError::MissingCollection`].
    #[must_use]
    pub fn from_error_body(collection: &str, body: &Value) -> Self {
        let message = match body {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map.get("message").and_then(Value::as_str),
            _ => None,
        }
        .map(str::trim)
        .filter(|m| !m.is_empty());

        let code = body.get("code").and_then(Value::as_str);

        match message {
            Some(message) if is_missing_collection(message, code) => Self::MissingCollection {
                collection: collection.to_string(),
                message: message.to_string(),
            },
            Some(message) => Self::Backend {
                message: message.to_string(),
                code: code.map(str::to_string),
            },
            None if code.is_some_and(is_undefined_table_code) => Self::MissingCollection {
                collection: collection.to_string(),
                message: body.to_string(),
            },
            None => Self::Unrecognized {
                raw: body.to_string(),
            },
        }
    }

    /// Whether this error means the target collection has not been provisioned.
    #[must_use]
    pub fn is_missing_collection(&self) -> bool {
        matches!(self, Self::MissingCollection { .. })
    }
}

fn is_undefined_table_code(code: &str) -> bool {
    code == PG_UNDEFINED_TABLE || code == PGRST_TABLE_NOT_FOUND
}

fn is_missing_collection(message: &str, code: Option<&str>) -> bool {
    if code.is_some_and(is_undefined_table_code) {
        return true;
    }
    let lower = message.to_ascii_lowercase();
    (lower.contains("relation") && lower.contains("does not exist"))
        || lower.contains("could not find the table")
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
