//! Request handler: runs the executor for each JSON-RPC call and delivers
//! its events.
//!
//! The [`RequestHandler`] trait is what the axum layer calls per method.
//! [`DefaultRequestHandler`] spawns the [`AgentExecutor`] on its own tokio
//! task and keeps no state between requests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::error::{AgentError, AgentResult};
use crate::types::{
    Message, SendMessageParams, StreamResponse, TaskIdParams, TaskState, TaskStatus,
    TaskStatusUpdateEvent,
};

use super::agent_executor::{AgentExecutor, RequestContext};
use super::event_queue::EventQueue;

/// Trait for handling A2A JSON-RPC requests.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handle `message/send`: run the agent and return its reply.
    async fn on_message_send(&self, params: SendMessageParams) -> AgentResult<Message>;

    /// Handle `message/stream`: run the agent and return its event stream.
    async fn on_message_send_stream(
        &self,
        params: SendMessageParams,
    ) -> AgentResult<broadcast::Receiver<StreamResponse>>;

    /// Handle `tasks/cancel`.
    async fn on_cancel_task(&self, params: TaskIdParams) -> AgentResult<TaskStatusUpdateEvent>;
}

/// Default request handler wiring an executor to per-request event queues.
pub struct DefaultRequestHandler {
    executor: Arc<dyn AgentExecutor>,
}

impl DefaultRequestHandler {
    /// Create a new default request handler.
    pub fn new(executor: Arc<dyn AgentExecutor>) -> Self {
        Self { executor }
    }

    /// Build a final `failed` status update carrying `text`.
    fn failed_event(task_id: &str, context_id: &str, text: String) -> StreamResponse {
        let message = Message::agent_text(text).in_task(task_id, context_id);
        StreamResponse::StatusUpdate(TaskStatusUpdateEvent {
            task_id: task_id.to_string(),
            context_id: context_id.to_string(),
            kind: "status-update".to_string(),
            status: TaskStatus::now(TaskState::Failed, Some(message)),
            r#final: true,
            metadata: None,
        })
    }

    /// Turn the final event of a `message/send` exchange into its reply.
    fn reply_from_final_event(event: StreamResponse) -> AgentResult<Message> {
        match event {
            StreamResponse::Message(message) => Ok(message),
            StreamResponse::StatusUpdate(update) => {
                let text = update
                    .status
                    .message
                    .as_ref()
                    .and_then(Message::first_text)
                    .unwrap_or_default()
                    .to_string();
                match (update.status.state, update.status.message) {
                    (TaskState::Completed, Some(message)) => Ok(message),
                    (state, _) => Err(AgentError::internal_error(format!(
                        "Task {} ended in state {state}: {text}",
                        update.task_id
                    ))),
                }
            }
        }
    }
}

#[async_trait]
impl RequestHandler for DefaultRequestHandler {
    async fn on_message_send(&self, params: SendMessageParams) -> AgentResult<Message> {
        let context = RequestContext::for_message(params.message, params.metadata);
        let task_id = context.task_id.clone();
        let event_queue = EventQueue::with_default_capacity();
        let mut rx = event_queue.subscribe();

        let executor = Arc::clone(&self.executor);
        let handle = tokio::spawn(async move { executor.execute(context, event_queue).await });

        let outcome = handle
            .await
            .map_err(|e| AgentError::internal_error(format!("Agent task panicked: {e}")))?;
        if let Err(e) = outcome {
            error!(task_id = %task_id, error = %e, "Agent execution failed");
            return Err(e);
        }

        // The queue is gone once the executor returns; drain what it buffered.
        loop {
            match rx.try_recv() {
                Ok(event) if event.is_final() => {
                    debug!(task_id = %task_id, "Final event received");
                    return Self::reply_from_final_event(event);
                }
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!(task_id = %task_id, missed = n, "Event consumer lagged");
                }
                Err(_) => {
                    return Err(AgentError::internal_error(
                        "Agent did not return any response",
                    ))
                }
            }
        }
    }

    async fn on_message_send_stream(
        &self,
        params: SendMessageParams,
    ) -> AgentResult<broadcast::Receiver<StreamResponse>> {
        let context = RequestContext::for_message(params.message, params.metadata);
        let task_id = context.task_id.clone();
        let context_id = context.context_id.clone();
        let event_queue = EventQueue::with_default_capacity();
        let rx = event_queue.subscribe();

        let executor = Arc::clone(&self.executor);
        tokio::spawn(async move {
            if let Err(e) = executor.execute(context, event_queue.clone()).await {
                error!(task_id = %task_id, error = %e, "Agent execution failed");
                event_queue.publish(Self::failed_event(
                    &task_id,
                    &context_id,
                    format!("Agent execution failed: {e}"),
                ));
            }
            event_queue.close();
        });

        Ok(rx)
    }

    async fn on_cancel_task(&self, params: TaskIdParams) -> AgentResult<TaskStatusUpdateEvent> {
        let context = RequestContext {
            task_id: params.id.clone(),
            context_id: String::new(),
            message: None,
            metadata: params.metadata,
        };
        let event_queue = EventQueue::with_default_capacity();
        let mut rx = event_queue.subscribe();

        self.executor.cancel(context, event_queue).await?;

        while let Ok(event) = rx.try_recv() {
            if let StreamResponse::StatusUpdate(update) = event {
                if update.status.state == TaskState::Canceled {
                    return Ok(update);
                }
            }
        }

        Ok(TaskStatusUpdateEvent {
            task_id: params.id,
            context_id: String::new(),
            kind: "status-update".to_string(),
            status: TaskStatus::now(TaskState::Canceled, None),
            r#final: true,
            metadata: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl AgentExecutor for Echo {
        async fn execute(&self, context: RequestContext, queue: EventQueue) -> AgentResult<()> {
            let reply = Message::agent_text(context.get_user_input(" "))
                .in_task(&context.task_id, &context.context_id);
            queue.publish(StreamResponse::Message(reply));
            Ok(())
        }

        async fn cancel(&self, _context: RequestContext, _queue: EventQueue) -> AgentResult<()> {
            Err(AgentError::CancellationUnsupported("cancel not supported".into()))
        }
    }

    struct Silent;

    #[async_trait]
    impl AgentExecutor for Silent {
        async fn execute(&self, _context: RequestContext, _queue: EventQueue) -> AgentResult<()> {
            Ok(())
        }

        async fn cancel(&self, context: RequestContext, queue: EventQueue) -> AgentResult<()> {
            queue.publish(StreamResponse::StatusUpdate(TaskStatusUpdateEvent {
                task_id: context.task_id,
                context_id: "ctx".into(),
                kind: "status-update".into(),
                status: TaskStatus::now(TaskState::Canceled, None),
                r#final: true,
                metadata: None,
            }));
            Ok(())
        }
    }

    fn params(text: &str) -> SendMessageParams {
        SendMessageParams {
            message: Message::user_text(text).in_task("t-1", "c-1"),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn send_returns_the_agent_message() {
        let handler = DefaultRequestHandler::new(Arc::new(Echo));
        let reply = handler.on_message_send(params("ping")).await.unwrap();
        assert_eq!(reply.first_text(), Some("ping"));
        assert_eq!(reply.task_id.as_deref(), Some("t-1"));
        assert_eq!(reply.context_id.as_deref(), Some("c-1"));
    }

    #[tokio::test]
    async fn send_without_any_event_is_an_internal_error() {
        let handler = DefaultRequestHandler::new(Arc::new(Silent));
        let err = handler.on_message_send(params("ping")).await.unwrap_err();
        assert_eq!(err.code(), crate::error::INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn stream_yields_the_message_then_closes() {
        let handler = DefaultRequestHandler::new(Arc::new(Echo));
        let mut rx = handler.on_message_send_stream(params("pong")).await.unwrap();

        match rx.recv().await.unwrap() {
            StreamResponse::Message(msg) => assert_eq!(msg.first_text(), Some("pong")),
            other => panic!("expected message, got {other:?}"),
        }
        assert!(rx.recv().await.is_err());
    }

    #[tokio::test]
    async fn cancel_error_propagates() {
        let handler = DefaultRequestHandler::new(Arc::new(Echo));
        let err = handler
            .on_cancel_task(TaskIdParams {
                id: "t-1".into(),
                metadata: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::CancellationUnsupported(_)));
    }

    #[tokio::test]
    async fn cancel_returns_the_published_update() {
        let handler = DefaultRequestHandler::new(Arc::new(Silent));
        let update = handler
            .on_cancel_task(TaskIdParams {
                id: "t-9".into(),
                metadata: None,
            })
            .await
            .unwrap();
        assert_eq!(update.task_id, "t-9");
        assert_eq!(update.status.state, TaskState::Canceled);
    }
}
