//! OpenAI-compatible chat-completions client.
//!
//! Used for OpenAI models directly and for Gemini models through Google's
//! OpenAI-compatible endpoint; only the base URL, key and model differ.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    BackendError, ChatBackend, ChatMessage, TextGenerationBackend, ToolDefinition,
    GEMINI_OPENAI_BASE_URL, OPENAI_BASE_URL,
};

/// Connection and sampling settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Bearer token. Calls fail with [`BackendError::MissingApiKey`] when absent.
    pub api_key: Option<String>,
    /// Name of the environment variable the key comes from, for error messages.
    pub api_key_env: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Settings for an OpenAI model with the default base URL.
    pub fn openai(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            api_key,
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: model.into(),
            temperature: 0.7,
            timeout: Duration::from_secs(120),
        }
    }

    /// Settings for a Gemini model through the OpenAI-compatible endpoint.
    pub fn gemini(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: GEMINI_OPENAI_BASE_URL.to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            ..Self::openai(api_key, model)
        }
    }

    /// Override the base URL (builder-style).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the sampling temperature (builder-style).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Chat-completions client over `reqwest`.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSpec<'a>>,
}

#[derive(Serialize)]
struct ToolSpec<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDefinition,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl OpenAiClient {
    /// Create a client; fails only if the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// The model this client talks to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatMessage, BackendError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| BackendError::MissingApiKey(self.config.api_key_env.clone()))?;

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            tools: tools
                .iter()
                .map(|function| ToolSpec {
                    kind: "function",
                    function,
                })
                .collect(),
        };

        debug!(
            model = %self.config.model,
            messages = messages.len(),
            tools = tools.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(e.to_string())
                } else {
                    BackendError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::Transport(format!("failed to read response body: {e}")))?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(BackendError::EmptyCompletion)
    }
}

#[async_trait]
impl TextGenerationBackend for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let reply = self.chat(&[ChatMessage::user(prompt)], &[]).await?;
        reply.content.ok_or(BackendError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_config_targets_compat_endpoint() {
        let config = OpenAiConfig::gemini(Some("k".into()), "gemini-2.5-pro");
        assert_eq!(config.base_url, GEMINI_OPENAI_BASE_URL);
        assert_eq!(config.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(config.model, "gemini-2.5-pro");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client =
            OpenAiClient::new(OpenAiConfig::openai(None, "gpt-4o-mini").with_base_url("http://x/v1/"))
                .unwrap();
        assert_eq!(client.endpoint(), "http://x/v1/chat/completions");
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = OpenAiClient::new(OpenAiConfig::openai(None, "gpt-4o-mini")).unwrap();
        let err = client.generate("hello").await.unwrap_err();
        assert_eq!(err, BackendError::MissingApiKey("OPENAI_API_KEY".to_string()));
    }
}
