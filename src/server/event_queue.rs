//! Event queue: broadcast channel between an executor and its consumers.
//!
//! The executor publishes [`StreamResponse`] events; the request handler
//! either collects the final one (`message/send`) or forwards each to an
//! SSE stream (`message/stream`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::types::StreamResponse;

/// Default channel capacity for the event queue.
const DEFAULT_CAPACITY: usize = 64;

/// Event queue for publishing and subscribing to executor events.
///
/// Built on `tokio::sync::broadcast`. Subscribe before the executor starts:
/// receivers only see events published after they were created.
#[derive(Debug, Clone)]
pub struct EventQueue {
    tx: broadcast::Sender<StreamResponse>,
    closed: Arc<AtomicBool>,
}

impl EventQueue {
    /// Create a new event queue with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        let (tx, _rx) = broadcast::channel(capacity);
        Self {
            tx,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a new event queue with the default capacity.
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamResponse> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers.
    ///
    /// Events published after [`close`](Self::close), or with nobody
    /// listening, are dropped with a warning.
    pub fn publish(&self, event: StreamResponse) {
        if self.closed.load(Ordering::Acquire) {
            warn!("Queue is closed. Event will not be published.");
            return;
        }

        match self.tx.send(event) {
            Ok(count) => debug!(subscriber_count = count, "Published event to queue"),
            Err(_) => warn!("Failed to publish event (no subscribers)"),
        }
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Refuse further events.
    pub fn close(&self) {
        debug!("Closing EventQueue.");
        self.closed.store(true, Ordering::Release);
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let queue = EventQueue::with_default_capacity();
        let mut rx = queue.subscribe();
        queue.publish(StreamResponse::Message(Message::agent_text("hi")));

        let event = rx.recv().await.unwrap();
        assert!(event.is_final());
    }

    #[tokio::test]
    async fn closed_queue_drops_events() {
        let queue = EventQueue::with_default_capacity();
        let mut rx = queue.subscribe();
        queue.close();
        queue.publish(StreamResponse::Message(Message::agent_text("late")));
        drop(queue);

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }

    #[test]
    fn subscriber_count_tracks_receivers() {
        let queue = EventQueue::new(4);
        assert_eq!(queue.subscriber_count(), 0);
        let _a = queue.subscribe();
        let _b = queue.subscribe();
        assert_eq!(queue.subscriber_count(), 2);
    }
}
