//! The orchestrator agent.
//!
//! Talks to the frontend over plain HTTP and delegates work to the worker
//! agents over A2A. The chat model decides which worker to call through a
//! single `send_message` tool; every downstream call passes through
//! [`OrchestratorAgent::call_agent`], which allows one call in flight at a
//! time.

pub mod session;

#[cfg(feature = "server")]
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{AgentError, AgentResult};
use crate::llm::{ChatBackend, ChatMessage, ToolCall, ToolDefinition};

pub use session::{SessionGuard, SessionStore};

/// Agent name reported to the model and in logs.
pub const ORCHESTRATOR_NAME: &str = "OrchestratorAgent";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Default bound on model turns that request tools within one user turn.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

/// Name of the only tool offered to the model.
pub const SEND_MESSAGE_TOOL: &str = "send_message";

/// System instruction given to the chat model.
pub const INSTRUCTION: &str = "\
You are an AI orchestrator agent for live-stream-app. Your role is to coordinate
specialized agents to help users create components, generate content, and manage workflows.

AVAILABLE SPECIALIZED AGENTS:
1. **Component Builder Agent** (A2A) - Generates and modifies React components
2. **Itinerary Agent** (A2A) - Creates structured itineraries and plans

CRITICAL CONSTRAINTS:
- You MUST call agents ONE AT A TIME, never make multiple tool calls simultaneously
- After making a tool call, WAIT for the result before making another tool call
- Do NOT make parallel/concurrent tool calls

WORKFLOW:
1. Understand the user's request
2. Identify which agent(s) are needed
3. Call agents sequentially with clear instructions
4. Aggregate results
5. Present a comprehensive response to the user

ALWAYS:
- Be helpful and proactive
- Explain what you're doing
- Handle errors gracefully
- Ask for clarification if needed";

/// A downstream agent the orchestrator can send tasks to.
#[async_trait]
pub trait RemoteAgent: Send + Sync {
    /// Send `task` as a single text message and return the reply text.
    async fn send_task(&self, task: &str) -> AgentResult<String>;
}

#[cfg(feature = "client")]
#[async_trait]
impl RemoteAgent for crate::client::A2AClient {
    async fn send_task(&self, task: &str) -> AgentResult<String> {
        let reply = self.send_text(task).await?;
        reply
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| AgentError::InvalidJson("agent reply has no text part".to_string()))
    }
}

/// A registry entry: a named downstream agent and its connection.
#[derive(Clone)]
pub struct RegisteredAgent {
    pub name: String,
    pub description: String,
    pub url: String,
    pub connection: Arc<dyn RemoteAgent>,
}

impl RegisteredAgent {
    /// Register the A2A agent at `url` under `name`.
    ///
    /// The agent card is fetched for its description; an unreachable agent is
    /// still registered with `fallback_description` so it can come up later.
    /// Requests always go to `url`, not to the URL advertised in the card.
    #[cfg(feature = "client")]
    pub async fn connect(name: &str, fallback_description: &str, url: &str) -> Self {
        use crate::client::{A2AClient, CardResolver};

        let (description, client) = match CardResolver::new().resolve(url).await {
            Ok(card) => {
                info!(agent = %name, card = %card.name, "Resolved agent card");
                (card.description.clone(), A2AClient::from_endpoint_with_card(url, card))
            }
            Err(e) => {
                warn!(agent = %name, url = %url, error = %e, "Agent card unavailable");
                (fallback_description.to_string(), A2AClient::from_endpoint(url))
            }
        };

        Self {
            name: name.to_string(),
            description,
            url: url.to_string(),
            connection: Arc::new(client),
        }
    }
}

impl std::fmt::Debug for RegisteredAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredAgent")
            .field("name", &self.name)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Public view of a registry entry, as served by `GET /agents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub description: String,
    pub url: String,
}

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub name: String,
    pub model: String,
    pub instruction: String,
    pub max_tool_rounds: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            name: ORCHESTRATOR_NAME.to_string(),
            model: DEFAULT_MODEL.to_string(),
            instruction: INSTRUCTION.to_string(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

/// Reply to one chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub session_id: String,
    pub reply: String,
}

#[derive(Debug, Deserialize)]
struct SendMessageArgs {
    agent_name: String,
    task: String,
}

/// The orchestrator: a chat backend, a registry of downstream agents and an
/// optional session store.
pub struct OrchestratorAgent {
    config: OrchestratorConfig,
    backend: Arc<dyn ChatBackend>,
    agents: Vec<RegisteredAgent>,
    sessions: Option<SessionStore>,
    gate: Mutex<()>,
}

impl OrchestratorAgent {
    pub fn new(config: OrchestratorConfig, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            config,
            backend,
            agents: Vec::new(),
            sessions: None,
            gate: Mutex::new(()),
        }
    }

    /// Register a downstream agent. Later entries with the same name are
    /// shadowed by earlier ones.
    pub fn with_agent(mut self, agent: RegisteredAgent) -> Self {
        self.agents.push(agent);
        self
    }

    /// Keep chat history per session.
    pub fn with_sessions(mut self, store: SessionStore) -> Self {
        self.sessions = Some(store);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn sessions(&self) -> Option<&SessionStore> {
        self.sessions.as_ref()
    }

    pub fn agents(&self) -> Vec<AgentInfo> {
        self.agents
            .iter()
            .map(|a| AgentInfo {
                name: a.name.clone(),
                description: a.description.clone(),
                url: a.url.clone(),
            })
            .collect()
    }

    /// Tool definitions offered to the model.
    pub fn tools(&self) -> Vec<ToolDefinition> {
        let names: Vec<&str> = self.agents.iter().map(|a| a.name.as_str()).collect();
        let roster = self
            .agents
            .iter()
            .map(|a| format!("- {}: {}", a.name, a.description))
            .collect::<Vec<_>>()
            .join("\n");

        vec![ToolDefinition {
            name: SEND_MESSAGE_TOOL.to_string(),
            description: format!(
                "Send a task to a specialized agent and wait for its reply. \
                 Only one agent can be called at a time.\nAgents:\n{roster}"
            ),
            parameters: json!({
                "type": "object",
                "properties": {
                    "agent_name": {
                        "type": "string",
                        "description": "Name of the agent to call",
                        "enum": names,
                    },
                    "task": {
                        "type": "string",
                        "description": "The task for the agent, usually a JSON object with an \"action\" field",
                    },
                },
                "required": ["agent_name", "task"],
            }),
        }]
    }

    /// Send `task` to the agent registered as `agent_name`.
    ///
    /// Holds the dispatch gate for the whole call, so concurrent callers are
    /// served one after another.
    pub async fn call_agent(&self, agent_name: &str, task: &str) -> AgentResult<String> {
        let agent = self
            .agents
            .iter()
            .find(|a| a.name == agent_name)
            .ok_or_else(|| {
                let known: Vec<&str> = self.agents.iter().map(|a| a.name.as_str()).collect();
                AgentError::invalid_params(format!(
                    "Unknown agent: {agent_name}. Available agents: {}",
                    known.join(", ")
                ))
            })?;

        let _permit = self.gate.lock().await;
        info!(agent = %agent.name, url = %agent.url, "Dispatching task to agent");
        let reply = agent.connection.send_task(task).await;
        debug!(agent = %agent.name, ok = reply.is_ok(), "Agent call finished");
        reply
    }

    /// Run one tool call and render its outcome as text for the model.
    async fn execute_tool_call(&self, call: &ToolCall) -> String {
        if call.function.name != SEND_MESSAGE_TOOL {
            warn!(tool = %call.function.name, "Model requested an unknown tool");
            return format!("Error: unknown tool {}", call.function.name);
        }

        let args: SendMessageArgs = match serde_json::from_str(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => return format!("Error: invalid arguments for {SEND_MESSAGE_TOOL}: {e}"),
        };

        match self.call_agent(&args.agent_name, &args.task).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(agent = %args.agent_name, error = %e, "Agent call failed");
                format!("Error: {e}")
            }
        }
    }

    /// Drive the model until it answers without requesting tools.
    ///
    /// `history` receives every assistant and tool message produced.
    pub async fn run_turn(&self, history: &mut Vec<ChatMessage>) -> AgentResult<String> {
        let tools = self.tools();

        for round in 0..=self.config.max_tool_rounds {
            let reply = self.backend.chat(&history[..], &tools).await?;
            let calls = reply.requested_tool_calls().to_vec();
            let content = reply.content.clone();
            history.push(reply);

            if calls.is_empty() {
                return Ok(content.unwrap_or_default());
            }

            if round == self.config.max_tool_rounds {
                break;
            }

            debug!(round, calls = calls.len(), "Model requested tool calls");
            for call in &calls {
                let output = self.execute_tool_call(call).await;
                history.push(ChatMessage::tool_result(call.id.clone(), output));
            }
        }

        Err(AgentError::internal_error(format!(
            "Tool call limit reached after {} rounds",
            self.config.max_tool_rounds
        )))
    }

    /// Handle one user message.
    ///
    /// With a session store the conversation continues from the stored
    /// history of `session_id` (a new id is minted when absent). Turns on the
    /// same session run one after another. Without a store every request
    /// starts fresh.
    pub async fn chat(&self, session_id: Option<String>, text: &str) -> AgentResult<ChatReply> {
        let session_id = session_id.unwrap_or_else(SessionStore::new_id);

        // Held for the whole turn: concurrent turns on one session queue up.
        let session = match &self.sessions {
            Some(store) => Some(store.checkout(&session_id).await),
            None => None,
        };

        let mut history = session
            .as_ref()
            .map(|s| s.history().to_vec())
            .unwrap_or_default();
        if history.is_empty() {
            history.push(ChatMessage::system(self.config.instruction.clone()));
        }
        history.push(ChatMessage::user(text));

        let reply = self.run_turn(&mut history).await?;

        if let Some(session) = session {
            session.commit(history);
        }

        Ok(ChatReply { session_id, reply })
    }
}
