//! High-level A2A client for calling remote agents.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{AgentError, AgentResult};
use crate::types::{
    AgentCard, JsonRpcRequest, JsonRpcResponse, Message, SendMessageParams, TaskIdParams,
    TaskStatusUpdateEvent,
};

use super::card_resolver::CardResolver;
use super::{ensure_success, request_error};

/// How long a call may take. Workers answer only after their model call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// JSON-RPC over HTTP client for one A2A agent.
///
/// Typed methods for the JSON-RPC methods the worker agents serve:
/// - `message/send`: send a message and get the agent's reply message
/// - `tasks/cancel`: ask the agent to cancel a task
///
/// ```no_run
/// use a2a_agents::client::A2AClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // From a base URL (resolves the agent card first):
/// let client = A2AClient::from_url("http://localhost:9001").await?;
///
/// // Or straight at a known endpoint:
/// let client = A2AClient::from_endpoint("http://localhost:9001/");
/// let reply = client.send_text(r#"{"action": "generate", "component_name": "Button"}"#).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct A2AClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    agent_card: Option<AgentCard>,
}

impl A2AClient {
    fn new(endpoint: impl Into<String>, agent_card: Option<AgentCard>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            agent_card,
        }
    }

    /// Resolve the agent card at `url` and connect to its JSON-RPC endpoint.
    pub async fn from_url(url: &str) -> AgentResult<Self> {
        let card = CardResolver::new().resolve(url).await?;
        Self::from_card(card)
    }

    /// Connect to the JSON-RPC endpoint advertised by `card`.
    ///
    /// # Errors
    ///
    /// Returns an error if the card advertises no JSON-RPC endpoint.
    pub fn from_card(card: AgentCard) -> AgentResult<Self> {
        let url = CardResolver::get_a2a_url(&card).ok_or_else(|| {
            AgentError::Transport(format!(
                "agent card for '{}' has no JSONRPC endpoint",
                card.name
            ))
        })?;
        Ok(Self::new(url, Some(card)))
    }

    /// Connect to `url` directly, keeping `card` for reference.
    ///
    /// Use when the card's advertised URL is not reachable from here (for
    /// example `localhost` inside a container).
    pub fn from_endpoint_with_card(url: &str, card: AgentCard) -> Self {
        Self::new(url, Some(card))
    }

    /// Create a client from a direct endpoint URL (skips agent card resolution).
    pub fn from_endpoint(url: &str) -> Self {
        Self::new(url, None)
    }

    /// Give up on a call after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The URL JSON-RPC requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The agent card, if one was resolved or supplied.
    pub fn get_card(&self) -> Option<&AgentCard> {
        self.agent_card.as_ref()
    }

    /// Send a message to the agent (`message/send`).
    pub async fn send_message(&self, params: SendMessageParams) -> AgentResult<Message> {
        self.call("message/send", &params).await
    }

    /// Cancel a task (`tasks/cancel`).
    pub async fn cancel_task(&self, params: TaskIdParams) -> AgentResult<TaskStatusUpdateEvent> {
        self.call("tasks/cancel", &params).await
    }

    /// Convenience: send a single-text user message.
    pub async fn send_text(&self, text: &str) -> AgentResult<Message> {
        self.send_message(SendMessageParams {
            message: Message::user_text(text),
            metadata: None,
        })
        .await
    }

    /// Convenience: send a single-text user message within a context.
    pub async fn send_text_in_context(&self, text: &str, context_id: &str) -> AgentResult<Message> {
        let mut message = Message::user_text(text);
        message.context_id = Some(context_id.to_string());
        self.send_message(SendMessageParams {
            message,
            metadata: None,
        })
        .await
    }

    /// Convenience: cancel a task by ID.
    pub async fn cancel_task_by_id(&self, task_id: &str) -> AgentResult<TaskStatusUpdateEvent> {
        self.cancel_task(TaskIdParams {
            id: task_id.to_string(),
            metadata: None,
        })
        .await
    }

    /// Post one JSON-RPC request and decode its result.
    async fn call<P, T>(&self, method: &str, params: &P) -> AgentResult<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let request = build_request(method, params)?;
        debug!(method, endpoint = %self.endpoint, "Calling remote agent");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_error(e, &self.endpoint))?;

        let response: JsonRpcResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| AgentError::InvalidJson(format!("failed to parse JSON-RPC response: {e}")))?;

        parse_result(response)
    }
}

/// Build a JSON-RPC request with a random UUID ID.
fn build_request(method: &str, params: &impl Serialize) -> AgentResult<JsonRpcRequest> {
    let params_value = serde_json::to_value(params).map_err(|e| {
        AgentError::Transport(format!("failed to serialize request params: {e}"))
    })?;

    Ok(JsonRpcRequest::new(method, params_value))
}

/// Parse the `result` field of a JSON-RPC response.
///
/// An `error` member becomes [`AgentError::JsonRpc`] with the remote code.
fn parse_result<T: DeserializeOwned>(response: JsonRpcResponse) -> AgentResult<T> {
    if let Some(error) = response.error {
        return Err(AgentError::JsonRpc {
            code: error.code,
            message: error.message,
            data: error.data,
        });
    }

    let result = response.result.ok_or_else(|| {
        AgentError::InvalidJson("JSON-RPC response has neither 'result' nor 'error'".to_string())
    })?;

    serde_json::from_value(result).map_err(|e| {
        AgentError::InvalidJson(format!("failed to deserialize response result: {e}"))
    })
}
