//! A2A server framework: executor trait, request handling and axum routes.
//!
//! - [`AgentExecutor`] trait: the agent logic
//! - [`RequestContext`]: task ids, inbound message and metadata
//! - [`EventQueue`]: broadcast channel for executor events
//! - [`RequestHandler`] trait + [`DefaultRequestHandler`]: JSON-RPC method handling
//! - [`WorkerExecutor`]: bridges A2A messages to a [`WorkerAgent`](crate::worker::WorkerAgent)
//! - [`a2a_router`]: ready-made axum routes
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use a2a_agents::builders::component_builder_card;
//! use a2a_agents::server::*;
//! use a2a_agents::worker::ComponentBuilderAgent;
//!
//! let agent = ComponentBuilderAgent::new(backend);
//! let executor: Arc<dyn AgentExecutor> = Arc::new(WorkerExecutor::new(agent));
//! let handler: Arc<dyn RequestHandler> = Arc::new(DefaultRequestHandler::new(executor));
//! let app = a2a_router(handler, component_builder_card(9001));
//! ```

pub mod agent_executor;
pub mod axum_integration;
pub mod event_queue;
pub mod request_handler;
pub mod worker_executor;

pub use agent_executor::{AgentExecutor, RequestContext};
pub use axum_integration::{a2a_router, AGENT_CARD_PATH, LEGACY_AGENT_CARD_PATH};
pub use event_queue::EventQueue;
pub use request_handler::{DefaultRequestHandler, RequestHandler};
pub use worker_executor::WorkerExecutor;
