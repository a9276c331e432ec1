//! Agent executor trait: the seam between HTTP plumbing and agent logic.
//!
//! Implementors read the inbound message from a [`RequestContext`] and
//! publish their answer to an [`EventQueue`].

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentResult;
use crate::types::{Message, Part};

use super::event_queue::EventQueue;

/// Context for one agent execution request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Task identifier; taken from the message or freshly generated.
    pub task_id: String,

    /// Conversation context identifier.
    pub context_id: String,

    /// The message that triggered this execution. `None` for cancel requests.
    pub message: Option<Message>,

    /// Metadata from the client request.
    pub metadata: Option<Value>,
}

impl RequestContext {
    /// Context for a new execution of `message`.
    ///
    /// Task and context ids come from the message when present.
    pub fn for_message(message: Message, metadata: Option<Value>) -> Self {
        let task_id = message
            .task_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let context_id = message
            .context_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Self {
            task_id,
            context_id,
            message: Some(message),
            metadata,
        }
    }

    /// The first text part of the inbound message, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.message.as_ref().and_then(Message::first_text)
    }

    /// All text parts of the inbound message joined by `delimiter`.
    ///
    /// Empty when there is no message or it has no text parts.
    pub fn get_user_input(&self, delimiter: &str) -> String {
        let Some(ref message) = self.message else {
            return String::new();
        };

        message
            .parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join(delimiter)
    }
}

/// Core trait for agent execution logic.
///
/// The request handler calls [`execute`](AgentExecutor::execute) on a
/// spawned task for every `message/send` and `message/stream`, and
/// [`cancel`](AgentExecutor::cancel) for `tasks/cancel`.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Run the agent for `context` and publish its answer to `event_queue`.
    ///
    /// The exchange ends at the first final event: a `Message`, or a status
    /// update that is flagged final or terminal.
    async fn execute(&self, context: RequestContext, event_queue: EventQueue) -> AgentResult<()>;

    /// Request cancellation of the task named by `context.task_id`.
    async fn cancel(&self, context: RequestContext, event_queue: EventQueue) -> AgentResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_message_keeps_caller_ids() {
        let message = Message::user_text("{}").in_task("task-1", "ctx-1");
        let context = RequestContext::for_message(message, None);
        assert_eq!(context.task_id, "task-1");
        assert_eq!(context.context_id, "ctx-1");
    }

    #[test]
    fn for_message_generates_missing_ids() {
        let context = RequestContext::for_message(Message::user_text("{}"), None);
        assert!(!context.task_id.is_empty());
        assert!(!context.context_id.is_empty());
        assert_ne!(context.task_id, context.context_id);
    }

    #[test]
    fn user_input_joins_text_parts() {
        let mut message = Message::user_text("first");
        message.parts.push(Part::data(serde_json::json!({"x": 1})));
        message.parts.push(Part::text("second"));
        let context = RequestContext::for_message(message, None);
        assert_eq!(context.get_user_input("\n"), "first\nsecond");
        assert_eq!(context.first_text(), Some("first"));
    }
}
