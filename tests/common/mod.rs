//! Shared test utilities for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use a2a_agents::builders::ServerBuilder;
use a2a_agents::error::AgentResult;
use a2a_agents::llm::{
    BackendError, ChatBackend, ChatMessage, FunctionCall, TextGenerationBackend, ToolCall,
    ToolDefinition,
};
use a2a_agents::orchestrator::RemoteAgent;
use a2a_agents::server::WorkerExecutor;
use a2a_agents::types::AgentCard;
use a2a_agents::worker::WorkerAgent;
use async_trait::async_trait;

/// Text backend that replays canned completions and records every prompt.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn replying(replies: impl IntoIterator<Item = &'static str>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: BackendError) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([Err(error)])),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerationBackend for ScriptedBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(BackendError::EmptyCompletion))
    }
}

/// Chat backend that replays canned assistant turns and records the
/// conversation it was shown on each call.
#[derive(Default)]
pub struct ScriptedChat {
    turns: Mutex<VecDeque<ChatMessage>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChat {
    pub fn new(turns: impl IntoIterator<Item = ChatMessage>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// The message lists passed to each `chat` call, in order.
    pub fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedChat {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> Result<ChatMessage, BackendError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(BackendError::EmptyCompletion)
    }
}

/// An assistant turn requesting `send_message` calls, in the given order.
pub fn tool_calls(calls: &[(&str, &str, &str)]) -> ChatMessage {
    ChatMessage {
        role: "assistant".to_string(),
        content: None,
        tool_calls: Some(
            calls
                .iter()
                .map(|(id, agent, task)| ToolCall {
                    id: id.to_string(),
                    kind: "function".to_string(),
                    function: FunctionCall {
                        name: "send_message".to_string(),
                        arguments: serde_json::json!({"agent_name": agent, "task": task})
                            .to_string(),
                    },
                })
                .collect(),
        ),
        tool_call_id: None,
    }
}

/// Remote agent that records tasks and the peak number of concurrent calls.
pub struct RecordingAgent {
    pub label: String,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingAgent {
    /// Agents built from the same `shared` tracker count concurrency jointly.
    pub fn new(label: &str, delay: Duration, shared: &CallTracker) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            delay,
            in_flight: shared.in_flight.clone(),
            peak: shared.peak.clone(),
            log: shared.log.clone(),
        })
    }
}

#[async_trait]
impl RemoteAgent for RecordingAgent {
    async fn send_task(&self, task: &str) -> AgentResult<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.label, task));

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(format!("{} did {}", self.label, task))
    }
}

/// Concurrency and ordering observations shared by [`RecordingAgent`]s.
#[derive(Default, Clone)]
pub struct CallTracker {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    log: Arc<Mutex<Vec<String>>>,
}

impl CallTracker {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

/// Serve `app` on a random local port. Returns the base URL and the task handle.
pub async fn serve(app: axum::Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Brief wait for the server to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (base_url, handle)
}

/// Start a worker behind the A2A routes on a random port.
pub async fn start_worker<W: WorkerAgent>(
    worker: W,
    card: AgentCard,
) -> (String, tokio::task::JoinHandle<()>) {
    let app = ServerBuilder::new(Arc::new(WorkerExecutor::new(worker)))
        .with_agent_card_direct(card)
        .build();
    serve(app).await
}

/// Helper to build a JSON-RPC request body.
pub fn jsonrpc_request(
    id: serde_json::Value,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

/// Helper to build a message/send request body.
pub fn message_send_request(id: i64, text: &str) -> serde_json::Value {
    jsonrpc_request(
        serde_json::json!(id),
        "message/send",
        serde_json::json!({
            "message": {
                "messageId": format!("test-msg-{}", id),
                "role": "user",
                "parts": [{"kind": "text", "text": text}]
            }
        }),
    )
}

/// Parse the TaskResult JSON carried by a JSON-RPC `message/send` response.
pub fn task_result_of(response: &serde_json::Value) -> serde_json::Value {
    let text = response["result"]["parts"][0]["text"]
        .as_str()
        .expect("reply has a text part");
    serde_json::from_str(text).expect("reply text is JSON")
}

/// A canned model answer for a Button component.
pub const BUTTON_COMPLETION: &str = "Here you go:\n\n```tsx\nexport function Button() {\n  return <button className=\"px-4\">Click</button>;\n}\n```\n\nUses shadcn/ui conventions.";
