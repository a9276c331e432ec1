//! # a2a-agents — LLM agents speaking the Agent-to-Agent (A2A) protocol
//!
//! Three small HTTP agents built on a shared A2A core:
//!
//! - a **component builder** worker that generates and modifies React
//!   components ([`worker::ComponentBuilderAgent`]),
//! - an **itinerary** worker that plans trips ([`worker::ItineraryAgent`]),
//! - an **orchestrator** that chats with a frontend and delegates to the
//!   workers over A2A, one call at a time ([`orchestrator::OrchestratorAgent`]).
//!
//! Workers receive a JSON task envelope as the text of an A2A message,
//! dispatch on its `action`, call the model once and answer with exactly one
//! agent message carrying a JSON [`worker::TaskResult`].
//!
//! ## Feature flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `client` | yes     | A2A client and the OpenAI-compatible model backend (reqwest) |
//! | `server` | yes     | A2A worker routes and orchestrator routes (axum) |
//! | `full`   | no      | Enable all features |
//!
//! ## Quick Start: Worker
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use a2a_agents::builders::{component_builder_card, ServerBuilder};
//! use a2a_agents::llm::{OpenAiClient, OpenAiConfig};
//! use a2a_agents::server::WorkerExecutor;
//! use a2a_agents::worker::ComponentBuilderAgent;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = OpenAiClient::new(OpenAiConfig::openai(None, "gpt-4o-mini"))?;
//!     let agent = ComponentBuilderAgent::new(Arc::new(backend));
//!
//!     let app = ServerBuilder::new(Arc::new(WorkerExecutor::new(agent)))
//!         .with_agent_card_direct(component_builder_card(9001))
//!         .build();
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:9001").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Quick Start: Client
//!
//! ```no_run
//! use a2a_agents::client::A2AClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = A2AClient::from_endpoint("http://localhost:9001/");
//!     let reply = client
//!         .send_text(r#"{"action": "generate", "component_name": "Button"}"#)
//!         .await?;
//!     println!("{}", reply.first_text().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`worker`]: task envelopes, results, fence extraction, the two workers
//! - [`server`]: executor trait, event queue, request handler, axum router
//! - [`client`]: card resolver and the JSON-RPC [`client::A2AClient`]
//! - [`llm`]: model backend traits and the OpenAI-compatible client
//! - [`orchestrator`]: tool loop, dispatch gate, sessions, HTTP routes
//! - [`config`], [`telemetry`]: CLI/env settings and logging for the binary

pub mod builders;
pub mod config;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod telemetry;
pub mod types;
pub mod worker;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "server")]
pub mod server;

/// Prelude module that re-exports commonly used types and traits.
///
/// ```
/// use a2a_agents::prelude::*;
///
/// let request = TaskRequest::parse(r#"{"action": "modify"}"#, "generate").unwrap();
/// assert_eq!(request.action(), "modify");
/// ```
pub mod prelude {
    pub use crate::types::{
        AgentCapabilities, AgentCard, AgentSkill, Message, Part, Role, SendMessageParams,
        StreamResponse, TaskState, TaskStatus, TaskStatusUpdateEvent,
    };

    pub use crate::error::{AgentError, AgentResult};

    pub use crate::builders::{AgentCardBuilder, AgentSkillBuilder};

    pub use crate::llm::{BackendError, ChatBackend, TextGenerationBackend};

    pub use crate::worker::{
        ComponentBuilderAgent, ItineraryAgent, TaskOutput, TaskRequest, TaskResult, WorkerAgent,
    };

    pub use crate::orchestrator::{OrchestratorAgent, OrchestratorConfig, RemoteAgent};

    #[cfg(feature = "client")]
    pub use crate::client::A2AClient;

    #[cfg(feature = "server")]
    pub use crate::builders::ServerBuilder;

    #[cfg(feature = "server")]
    pub use crate::server::{
        a2a_router, AgentExecutor, DefaultRequestHandler, EventQueue, RequestContext,
        WorkerExecutor,
    };
}

// Re-export core types at crate root for convenience.
pub use builders::{AgentCardBuilder, AgentSkillBuilder};
pub use error::{AgentError, AgentResult};
pub use types::*;

#[cfg(feature = "server")]
pub use builders::ServerBuilder;
