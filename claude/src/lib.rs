//! Minimal Anthropic Claude API client.
//!
//! This crate covers the one thing the planner needs from Claude: a
//! single-shot, non-streaming completion. [`extract_json_object`] helps
//! callers that asked for JSON but got it wrapped in prose.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const API_BASE: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Errors that can occur when using the Claude client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// HTTP settings for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// API root, overridable for proxies.
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(15),
            base_url: API_BASE.to_string(),
        }
    }
}

/// Claude API client.
#[derive(Clone)]
pub struct Claude {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for Claude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Claude")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Claude {
    /// Create a client with default HTTP settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Create a client with explicit HTTP settings.
    pub fn with_config(api_key: impl Into<String>, config: ClientConfig) -> Result<Self, Error> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::NoApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| Error::NoApiKey)?;
        Self::new(api_key)
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The model used when a query does not name one.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single query and wait for the whole reply.
    pub async fn complete(&self, query: Query) -> Result<Reply, Error> {
        let body = self.build_api_request(&query);
        debug!(model = %body.model, max_tokens = body.max_tokens, "sending Claude query");

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(Reply::from(api_response))
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    fn build_api_request(&self, query: &Query) -> ApiRequest {
        ApiRequest {
            model: query.model.clone().unwrap_or_else(|| self.model.clone()),
            max_tokens: query.max_tokens,
            system: query.system.clone(),
            messages: query
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.as_str(),
                    content: m.text.clone(),
                })
                .collect(),
            temperature: query.temperature,
        }
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A single-shot query.
#[derive(Debug, Clone)]
pub struct Query {
    pub model: Option<String>,
    pub max_tokens: usize,
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
}

impl Query {
    /// A query consisting of one user turn.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: None,
            max_tokens: 1024,
            system: None,
            messages: vec![Message::user(prompt)],
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A text message in the conversation.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A completed reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub id: String,
    pub model: String,
    /// All text blocks joined together.
    pub text: String,
    pub stop_reason: StopReason,
    pub usage: Usage,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    Other,
}

impl StopReason {
    fn parse(reason: Option<&str>) -> Self {
        match reason {
            Some("end_turn") => StopReason::EndTurn,
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::Other,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// Slice out the outermost `{ ... }` of a text, if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    id: String,
    model: String,
    content: Vec<ApiContent>,
    stop_reason: Option<String>,
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContent {
    Text {
        text: String,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: usize,
    output_tokens: usize,
}

impl From<ApiResponse> for Reply {
    fn from(api: ApiResponse) -> Self {
        let text = api
            .content
            .into_iter()
            .filter_map(|block| match block {
                ApiContent::Text { text } => Some(text),
                ApiContent::Unsupported => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Reply {
            id: api.id,
            model: api.model,
            text,
            stop_reason: StopReason::parse(api.stop_reason.as_deref()),
            usage: Usage {
                input_tokens: api.usage.input_tokens,
                output_tokens: api.usage.output_tokens,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = Claude::new("test-key").unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(matches!(Claude::new("  "), Err(Error::NoApiKey)));
    }

    #[test]
    fn test_client_with_model() {
        let client = Claude::new("test-key").unwrap().with_model("claude-3-haiku");
        assert_eq!(client.model(), "claude-3-haiku");
    }

    #[test]
    fn test_query_builder() {
        let query = Query::new("Find a place")
            .with_system("You are a research assistant")
            .with_max_tokens(150)
            .with_temperature(0.0);

        assert_eq!(query.max_tokens, 150);
        assert_eq!(query.temperature, Some(0.0));
        assert_eq!(query.system.as_deref(), Some("You are a research assistant"));
        assert_eq!(query.messages.len(), 1);
        assert_eq!(query.messages[0].role, Role::User);
    }

    #[test]
    fn test_api_request_uses_client_model() {
        let client = Claude::new("test-key").unwrap().with_model("m1");
        let body = client.build_api_request(&Query::new("hi"));
        assert_eq!(body.model, "m1");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json.get("system").is_none());
    }

    #[test]
    fn test_response_conversion() {
        let api: ApiResponse = serde_json::from_value(serde_json::json!({
            "id": "msg_1",
            "model": "m",
            "content": [
                {"type": "text", "text": "{\"a\": "},
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "1}"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 3, "output_tokens": 4}
        }))
        .unwrap();

        let reply = Reply::from(api);
        assert_eq!(reply.text, "{\"a\": 1}");
        assert_eq!(reply.stop_reason, StopReason::EndTurn);
        assert_eq!(reply.usage.output_tokens, 4);
    }

    #[test]
    fn test_extract_json_object_inside_prose() {
        let text = "Sure! ```json\n{\"name\": \"Ella\"}\n```";
        assert_eq!(extract_json_object(text), Some("{\"name\": \"Ella\"}"));
        assert_eq!(extract_json_object("no idea"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }
}
