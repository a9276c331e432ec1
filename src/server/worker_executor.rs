//! Bridge from A2A requests to a [`WorkerAgent`].
//!
//! Every execution publishes exactly one event: an agent message whose only
//! text part is the JSON-serialized [`TaskResult`]. Malformed requests and
//! worker failures become error results inside that message rather than
//! executor errors, so callers always get an answer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::{AgentError, AgentResult};
use crate::types::{Message, StreamResponse};
use crate::worker::{TaskResult, WorkerAgent};

use super::agent_executor::{AgentExecutor, RequestContext};
use super::event_queue::EventQueue;

/// [`AgentExecutor`] that dispatches message text to a worker agent.
pub struct WorkerExecutor<W> {
    worker: Arc<W>,
}

impl<W: WorkerAgent> WorkerExecutor<W> {
    pub fn new(worker: W) -> Self {
        Self {
            worker: Arc::new(worker),
        }
    }

    /// The wrapped worker.
    pub fn worker(&self) -> &W {
        &self.worker
    }

    /// Run the worker on the request's first text part.
    pub async fn run(&self, context: &RequestContext) -> TaskResult {
        match context.first_text() {
            Some(text) => self.worker.handle_text(text).await,
            None => TaskResult::failure("Request message has no text part"),
        }
    }
}

#[async_trait]
impl<W: WorkerAgent> AgentExecutor for WorkerExecutor<W> {
    async fn execute(&self, context: RequestContext, event_queue: EventQueue) -> AgentResult<()> {
        let result = self.run(&context).await;

        info!(
            task_id = %context.task_id,
            success = result.is_success(),
            "Worker task finished"
        );

        let reply = Message::agent_text(result.to_json_string())
            .in_task(context.task_id, context.context_id);
        event_queue.publish(StreamResponse::Message(reply));
        Ok(())
    }

    async fn cancel(&self, _context: RequestContext, _event_queue: EventQueue) -> AgentResult<()> {
        Err(AgentError::CancellationUnsupported(
            "cancel not supported".to_string(),
        ))
    }
}
