//! Form assistant backed by the Anthropic Messages API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tower_core::EntityKind;
use tracing::{debug, error, warn};

use crate::assistant::FormAssistant;
use crate::error::{AssistError, AssistResult};
use crate::extract::extract_json_object;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Settings for [`ClaudeAssistant`].
#[derive(Clone)]
pub struct ClaudeSettings {
    /// API key.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Maximum tokens in the reply.
    pub max_tokens: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// Endpoint override (defaults to the public Messages API).
    pub api_url: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for ClaudeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeSettings")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClaudeSettings {
    /// Create settings with the given key and model.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 2048,
            temperature: 0.4,
            api_url: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Set max tokens.
    #[must_use]
    pub fn max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = max;
        self
    }

    /// Set temperature.
    #[must_use]
    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    /// Override the endpoint.
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }
}

/// Suggests form values by prompting Claude with the kind's allowed fields.
#[derive(Debug)]
pub struct ClaudeAssistant {
    client: Client,
    settings: ClaudeSettings,
}

impl ClaudeAssistant {
    /// Create a new assistant.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: ClaudeSettings) -> AssistResult<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    fn system_prompt(kind: EntityKind) -> String {
        format!(
            "You help operators of the PidgeyPost admin console fill in a {label} form.\n\
             Reply with exactly one JSON object and nothing else.\n\
             Use only these keys: {fields}.\n\
             Omit keys you have no good value for. Timestamps are RFC 3339 strings.",
            label = kind.label(),
            fields = kind.allowed_fields().join(", "),
        )
    }

    fn user_prompt(kind: EntityKind, context: Option<&str>) -> String {
        match context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(context) => format!("Draft a {} from this context:\n{context}", kind.label()),
            None => format!("Suggest plausible values for a new {}.", kind.label()),
        }
    }

    /// Build the API request body.
    fn build_request(&self, kind: EntityKind, context: Option<&str>) -> Value {
        serde_json::json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "system": Self::system_prompt(kind),
            "messages": [{
                "role": "user",
                "content": Self::user_prompt(kind, context),
            }],
        })
    }

    /// Concatenate the text blocks of a reply.
    fn reply_text(response: &ApiResponse) -> String {
        response
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[async_trait]
impl FormAssistant for ClaudeAssistant {
    async fn suggest(
        &self,
        kind: EntityKind,
        context: Option<&str>,
    ) -> AssistResult<Option<Map<String, Value>>> {
        if self.settings.api_key.is_empty() {
            return Err(AssistError::ApiKeyNotConfigured {
                provider: "claude".to_string(),
            });
        }

        let request_body = self.build_request(kind, context);
        let url = self.settings.api_url.as_deref().unwrap_or(ANTHROPIC_API_URL);

        debug!(model = %self.settings.model, kind = %kind, "Requesting form suggestion");

        let mut api_key_header = reqwest::header::HeaderValue::try_from(&self.settings.api_key)
            .map_err(|e| AssistError::ConfigError(format!("Invalid API key characters: {e}")))?;
        api_key_header.set_sensitive(true);

        let response = self
            .client
            .post(url)
            .header("x-api-key", api_key_header)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Claude API error");

            if status.as_u16() == 429 {
                return Err(AssistError::RateLimitExceeded {
                    retry_after_secs: 60,
                });
            }

            return Err(AssistError::ApiRequestFailed(format!(
                "Status {status}: {body}"
            )));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| AssistError::InvalidResponse(e.to_string()))?;

        let text = Self::reply_text(&api_response);
        let suggestion = extract_json_object(&text);
        if suggestion.is_none() {
            warn!(kind = %kind, "Assistant reply contained no JSON object");
        }
        Ok(suggestion)
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}
