//! Mock implementations for testing.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use tower_assist::{AssistError, AssistResult, FormAssistant};
use tower_core::EntityKind;
use tower_storage::{GatewayError, GatewayResult, Listing, PersistenceGateway};

/// A scripted gateway answer.
#[derive(Debug, Clone)]
enum GatewayReply {
    /// Fail with a raw backend error body.
    ErrorBody(Value),
    /// Fail before the backend answers.
    Transport(String),
}

/// A call recorded by [`MockGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCall {
    /// Operation name (`create`, `update`, `list`).
    pub op: &'static str,
    /// Collection addressed.
    pub collection: String,
    /// Payload sent, if any.
    pub payload: Option<Map<String, Value>>,
}

/// Mock implementation of [`PersistenceGateway`] for testing.
///
/// Succeeds by default, echoing the payload with a generated `id`. Scripted
/// failures are consumed in order, one per call. Uses `std::sync::Mutex`
/// internally so builder methods need no runtime.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    replies: Arc<Mutex<VecDeque<GatewayReply>>>,
    calls: Arc<Mutex<Vec<GatewayCall>>>,
    delay: Option<Duration>,
}

impl MockGateway {
    /// Create a mock gateway that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failure with a raw backend error body.
    ///
    /// The body is classified the way a real gateway would classify it.
    #[must_use]
    pub fn with_error_body(self, body: Value) -> Self {
        self.queue(GatewayReply::ErrorBody(body));
        self
    }

    /// Queue a transport failure.
    #[must_use]
    pub fn with_transport_failure(self, message: impl Into<String>) -> Self {
        self.queue(GatewayReply::Transport(message.into()));
        self
    }

    /// Delay every call by `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a raw error body for the next call.
    pub fn queue_error_body(&self, body: Value) {
        self.queue(GatewayReply::ErrorBody(body));
    }

    fn queue(&self, reply: GatewayReply) {
        if let Ok(mut guard) = self.replies.lock() {
            guard.push_back(reply);
        }
    }

    /// All calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Payloads sent to `create` for `collection`.
    #[must_use]
    pub fn created(&self, collection: &str) -> Vec<Map<String, Value>> {
        self.calls()
            .into_iter()
            .filter(|c| c.op == "create" && c.collection == collection)
            .filter_map(|c| c.payload)
            .collect()
    }

    async fn record(
        &self,
        op: &'static str,
        collection: &str,
        payload: Option<Map<String, Value>>,
    ) -> GatewayResult<()> {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(GatewayCall {
                op,
                collection: collection.to_string(),
                payload,
            });
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        match reply {
            None => Ok(()),
            Some(GatewayReply::ErrorBody(body)) => {
                Err(GatewayError::from_error_body(collection, &body))
            },
            Some(GatewayReply::Transport(message)) => Err(GatewayError::Transport(message)),
        }
    }
}

#[async_trait]
impl PersistenceGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create(&self, collection: &str, payload: Map<String, Value>) -> GatewayResult<Value> {
        self.record("create", collection, Some(payload.clone())).await?;
        let mut row = payload;
        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        Ok(Value::Object(row))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        payload: Map<String, Value>,
    ) -> GatewayResult<Value> {
        self.record("update", collection, Some(payload.clone())).await?;
        let mut row = payload;
        row.insert("id".to_string(), Value::String(id.to_string()));
        Ok(Value::Object(row))
    }

    async fn list(&self, collection: &str) -> GatewayResult<Listing> {
        self.record("list", collection, None).await?;
        Ok(Listing::default())
    }
}

/// A scripted assistant answer.
#[derive(Debug, Clone)]
enum AssistReply {
    Fill(Map<String, Value>),
    Nothing,
    Fail(String),
}

/// Mock implementation of [`FormAssistant`] for testing.
///
/// Answers are consumed in order; with an empty queue it has no suggestion.
#[derive(Debug, Clone, Default)]
pub struct MockAssistant {
    replies: Arc<Mutex<VecDeque<AssistReply>>>,
    requests: Arc<Mutex<Vec<(EntityKind, Option<String>)>>>,
}

impl MockAssistant {
    /// Create a mock assistant with no queued answers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a suggestion.
    #[must_use]
    pub fn with_suggestion(self, suggestion: Map<String, Value>) -> Self {
        self.queue(AssistReply::Fill(suggestion));
        self
    }

    /// Queue a "no suggestion" answer.
    #[must_use]
    pub fn with_no_suggestion(self) -> Self {
        self.queue(AssistReply::Nothing);
        self
    }

    /// Queue a provider failure.
    #[must_use]
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.queue(AssistReply::Fail(message.into()));
        self
    }

    fn queue(&self, reply: AssistReply) {
        if let Ok(mut guard) = self.replies.lock() {
            guard.push_back(reply);
        }
    }

    /// Requests received so far, as `(kind, context)`.
    #[must_use]
    pub fn requests(&self) -> Vec<(EntityKind, Option<String>)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl FormAssistant for MockAssistant {
    async fn suggest(
        &self,
        kind: EntityKind,
        context: Option<&str>,
    ) -> AssistResult<Option<Map<String, Value>>> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push((kind, context.map(str::to_string)));
        }
        let reply = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        match reply {
            Some(AssistReply::Fill(map)) => Ok(Some(map)),
            Some(AssistReply::Nothing) | None => Ok(None),
            Some(AssistReply::Fail(message)) => Err(AssistError::ApiRequestFailed(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_gateway_success_echoes_payload() {
        let gateway = MockGateway::new();
        let row = gateway
            .create("promos", crate::form(json!({"code": "FALL10"})))
            .await
            .unwrap();
        assert_eq!(row["code"], "FALL10");
        assert!(row["id"].is_string());
        assert_eq!(gateway.created("promos").len(), 1);
    }

    #[tokio::test]
    async fn test_mock_gateway_scripted_failures() {
        let gateway = MockGateway::new()
            .with_error_body(json!({"message": "relation \"promos\" does not exist"}))
            .with_transport_failure("connection reset");

        let first = gateway.create("promos", Map::new()).await.unwrap_err();
        assert!(first.is_missing_collection());

        let second = gateway.create("promos", Map::new()).await.unwrap_err();
        assert!(matches!(second, GatewayError::Transport(_)));

        assert!(gateway.create("promos", Map::new()).await.is_ok());
        assert_eq!(gateway.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_assistant_queue() {
        let assistant = MockAssistant::new()
            .with_suggestion(crate::form(json!({"rarity": "Rare"})))
            .with_failure("boom");

        let first = assistant
            .suggest(EntityKind::Stamp, Some("brief"))
            .await
            .unwrap();
        assert_eq!(first.unwrap()["rarity"], "Rare");
        assert!(assistant.suggest(EntityKind::Stamp, None).await.is_err());
        assert!(assistant.suggest(EntityKind::Stamp, None).await.unwrap().is_none());

        let requests = assistant.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].1.as_deref(), Some("brief"));
    }
}
