//! Chat model abstraction and an OpenAI-compatible HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use super::ExamError;

/// Sampling temperature used for exam questions.
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// System-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// User-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Named JSON schema the reply must conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFormat {
    /// Schema name.
    pub name: String,
    /// JSON schema.
    pub schema: Value,
}

impl ResponseFormat {
    /// Create a response format.
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    fn to_request_value(&self) -> Value {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": self.name,
                "schema": self.schema,
                "strict": true,
            }
        })
    }
}

/// A chat completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete the conversation and return the reply text.
    async fn complete(&self, messages: &[ChatMessage], format: Option<&ResponseFormat>) -> Result<String, ExamError>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

/// Endpoint and sampling settings for [`OpenAiCompatibleClient`].
#[derive(Debug, Clone)]
pub struct ChatModelConfig {
    /// Base URL up to, not including, `/chat/completions`.
    pub base_url: String,
    /// Bearer token; omitted from requests when `None`.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Completion length cap.
    pub max_tokens: Option<u32>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ChatModelConfig {
    /// Configuration for `model` served at `base_url`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Authenticate with a bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap completion length.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Client for any endpoint speaking the OpenAI chat completions protocol.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    config: ChatModelConfig,
    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    /// Build a client from configuration.
    pub fn new(config: ChatModelConfig) -> Result<Self, ExamError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ChatModelConfig {
        &self.config
    }

    fn request_body(&self, messages: &[ChatMessage], format: Option<&ResponseFormat>) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
        });
        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(format) = format {
            body["response_format"] = format.to_request_value();
        }
        body
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleClient {
    async fn complete(&self, messages: &[ChatMessage], format: Option<&ResponseFormat>) -> Result<String, ExamError> {
        let url = self.config.completions_url();
        let body = self.request_body(messages, format);
        tracing::debug!(%url, model = %self.config.model, "sending chat completion");

        let mut request = self.client.post(&url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExamError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response.json().await?;
        json.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ExamError::MissingContent)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiCompatibleClient {
        let config = ChatModelConfig::new(format!("{}/v1/", server.uri()), "test-model").with_api_key("secret");
        OpenAiCompatibleClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "temperature": 0.1,
                "response_format": {"type": "json_schema"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"BLANK\": \"-t\"}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let format = ResponseFormat::new("QuestionAnswer", json!({"type": "object"}));
        let reply = client_for(&server)
            .complete(&[ChatMessage::system("hi")], Some(&format))
            .await
            .unwrap();
        assert_eq!(reply, "{\"BLANK\": \"-t\"}");
    }

    #[tokio::test]
    async fn error_status_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&[ChatMessage::user("hi")], None)
            .await
            .unwrap_err();
        match err {
            ExamError::Api { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_missing_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&[ChatMessage::user("hi")], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::MissingContent));
    }

    #[test]
    fn url_tolerates_trailing_slash() {
        let config = ChatModelConfig::new("http://localhost:8000/v1/", "m");
        assert_eq!(config.completions_url(), "http://localhost:8000/v1/chat/completions");
    }
}
