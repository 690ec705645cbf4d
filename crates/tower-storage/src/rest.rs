//! PostgREST-backed gateway.
//!
//! Speaks the REST dialect exposed by managed Postgres backends:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | create | `POST {url}/rest/v1/{collection}` with `Prefer: return=representation` |
//! | update | `PATCH {url}/rest/v1/{collection}?id=eq.{id}` |
//! | list | `GET {url}/rest/v1/{collection}?select=*` with `Prefer: count=exact` |
//!
//! Error bodies are classified with [`GatewayError::from_error_body`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{Listing, PersistenceGateway, validate_collection};

const REST_PATH: &str = "rest/v1";

/// Connection settings for a [`RestGateway`].
#[derive(Clone)]
pub struct RestGatewayConfig {
    /// Project base URL (e.g. `https://abc.example.co`).
    pub url: String,
    /// Service key, sent as `apikey` and bearer token.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Non-default Postgres schema, sent as `Accept-Profile`/`Content-Profile`.
    pub schema: Option<String>,
}

impl std::fmt::Debug for RestGatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGatewayConfig")
            .field("url", &self.url)
            .field("api_key", &"***")
            .field("timeout", &self.timeout)
            .field("schema", &self.schema)
            .finish()
    }
}

/// Gateway that writes to a PostgREST endpoint over HTTPS.
pub struct RestGateway {
    client: Client,
    base: String,
    schema: Option<String>,
}

impl RestGateway {
    /// Build a gateway from its connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the URL is not http(s), the key
    /// contains characters that cannot go in a header, or the HTTP client
    /// cannot be built.
    pub fn new(config: RestGatewayConfig) -> GatewayResult<Self> {
        let url = config.url.trim_end_matches('/');
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(GatewayError::Config(format!(
                "gateway url must start with http:// or https://, got {url}"
            )));
        }
        if config.api_key.is_empty() {
            return Err(GatewayError::Config("gateway api key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(auth_headers(&config.api_key)?)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base: format!("{url}/{REST_PATH}"),
            schema: config.schema,
        })
    }

    fn endpoint(&self, collection: &str) -> GatewayResult<String> {
        validate_collection(collection)?;
        Ok(format!("{}/{collection}", self.base))
    }

    fn with_schema(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.schema {
            Some(schema) => request
                .header("Accept-Profile", schema)
                .header("Content-Profile", schema),
            None => request,
        }
    }

    async fn send(&self, collection: &str, request: RequestBuilder) -> GatewayResult<Response> {
        let response = self
            .with_schema(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        error!(collection, status = %status, body = %text, "gateway request failed");
        Err(GatewayError::from_error_body(
            collection,
            &error_body(status.as_u16(), &text),
        ))
    }
}

impl std::fmt::Debug for RestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGateway")
            .field("base", &self.base)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

fn auth_headers(api_key: &str) -> GatewayResult<HeaderMap> {
    let invalid = |e: reqwest::header::InvalidHeaderValue| {
        GatewayError::Config(format!("invalid api key characters: {e}"))
    };

    let mut key = HeaderValue::try_from(api_key).map_err(invalid)?;
    key.set_sensitive(true);
    let mut bearer = HeaderValue::try_from(format!("Bearer {api_key}")).map_err(invalid)?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("apikey", key);
    headers.insert(reqwest::header::AUTHORIZATION, bearer);
    Ok(headers)
}

/// Turn a non-2xx response body into JSON for classification.
fn error_body(status: u16, text: &str) -> Value {
    if text.trim().is_empty() {
        return json!({ "status": status });
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Total row count from a `Content-Range` header (`0-24/57`, `*/0`).
fn parse_content_range(header: &str) -> Option<usize> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

/// First row of a `return=representation` response.
fn first_row(body: Value) -> Value {
    match body {
        Value::Array(mut rows) if !rows.is_empty() => rows.swap_remove(0),
        Value::Array(_) => Value::Null,
        other => other,
    }
}

#[async_trait]
impl PersistenceGateway for RestGateway {
    fn name(&self) -> &str {
        "rest"
    }

    async fn create(&self, collection: &str, payload: Map<String, Value>) -> GatewayResult<Value> {
        let url = self.endpoint(collection)?;
        debug!(collection, fields = payload.len(), "gateway create");

        let request = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(&payload);
        let response = self.send(collection, request).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(first_row(body))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        payload: Map<String, Value>,
    ) -> GatewayResult<Value> {
        let url = self.endpoint(collection)?;
        debug!(collection, id, "gateway update");

        let request = self
            .client
            .patch(url)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&payload);
        let response = self.send(collection, request).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        match first_row(body) {
            Value::Null => Err(GatewayError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
            row => Ok(row),
        }
    }

    async fn list(&self, collection: &str) -> GatewayResult<Listing> {
        let url = self.endpoint(collection)?;

        let request = self
            .client
            .get(url)
            .query(&[("select", "*")])
            .header("Prefer", "count=exact");
        let response = self.send(collection, request).await?;
        let total = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);
        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Listing {
            count: total.unwrap_or(rows.len()),
            rows,
        })
    }
}
