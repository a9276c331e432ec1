//! Text-generation backends.
//!
//! Worker agents depend only on [`TextGenerationBackend`]: one prompt in,
//! one completion out. The orchestrator additionally needs tool calling and
//! depends on [`ChatBackend`]. Both are object-safe so a scripted backend can
//! stand in for the network client in tests.
//!
//! The message shapes follow the OpenAI chat-completions wire format, which
//! both OpenAI and Gemini (through its OpenAI-compatible endpoint) accept.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "client")]
pub mod openai;

#[cfg(feature = "client")]
pub use openai::{OpenAiClient, OpenAiConfig};

/// Default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Gemini's OpenAI-compatible base URL.
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Failure of a single call to a model backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// No credential configured for the backend.
    #[error("missing API key: set {0}")]
    MissingApiKey(String),

    /// The request never produced an HTTP response.
    #[error("backend request failed: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("backend request timed out: {0}")]
    Timeout(String),

    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The response body could not be understood.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// The backend answered without any completion content.
    #[error("backend returned no completion")]
    EmptyCompletion,
}

/// One prompt in, one completion out.
#[async_trait]
pub trait TextGenerationBackend: Send + Sync {
    /// Send `prompt` as a single user turn and return the completion text.
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Chat completion with function calling.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one model turn over `messages`, offering `tools`.
    ///
    /// Returns the assistant message, which carries either text content or
    /// tool calls (or both).
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatMessage, BackendError>;
}

/// Chat message (OpenAI-compatible format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user`, `assistant` or `tool`.
    pub role: String,

    /// Text content; `null` on assistant turns that only call tools.
    #[serde(default)]
    pub content: Option<String>,

    /// Tool calls requested by an assistant turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// The call a `tool` message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// A system instruction.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content)
    }

    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    /// An assistant turn with text only.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content)
    }

    /// The result of a tool call.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Tool calls requested by this message, empty when there are none.
    pub fn requested_tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }
}

/// Tool call structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier, echoed back in the tool result message.
    pub id: String,

    /// Always `"function"`.
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,

    /// The function being called.
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

/// Function call structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,

    /// JSON-encoded arguments.
    pub arguments: String,
}

/// Tool definition for function calling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Function name.
    pub name: String,

    /// What the function does, shown to the model.
    pub description: String,

    /// JSON Schema of the arguments object.
    pub parameters: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_tool_call_message_parses_null_content() {
        let msg: ChatMessage = serde_json::from_value(serde_json::json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "send_message", "arguments": "{}"}
            }]
        }))
        .unwrap();

        assert!(msg.content.is_none());
        assert_eq!(msg.requested_tool_calls().len(), 1);
        assert_eq!(msg.requested_tool_calls()[0].function.name, "send_message");
    }

    #[test]
    fn tool_result_serializes_call_id() {
        let json = serde_json::to_value(ChatMessage::tool_result("call_9", "ok")).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_9");
        assert!(json.get("tool_calls").is_none());
    }
}
