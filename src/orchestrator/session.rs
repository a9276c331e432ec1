//! In-memory chat sessions with idle expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use crate::llm::ChatMessage;

#[derive(Debug)]
struct Session {
    history: Vec<ChatMessage>,
    last_active: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            history: Vec::new(),
            last_active: Instant::now(),
        }
    }
}

type Slot = Arc<Mutex<Session>>;

/// Chat history keyed by session id.
///
/// A session expires once it has been idle for longer than the timeout.
/// Expired sessions are dropped lazily on access and by [`purge_expired`].
/// A session held by a running turn never counts as idle.
///
/// [`purge_expired`]: SessionStore::purge_expired
#[derive(Debug)]
pub struct SessionStore {
    timeout: Duration,
    sessions: RwLock<HashMap<String, Slot>>,
}

/// Exclusive access to one session for the length of a chat turn.
///
/// Other turns on the same session wait until the guard is dropped.
/// Dropping it without [`commit`](SessionGuard::commit) leaves the stored
/// history untouched.
#[derive(Debug)]
pub struct SessionGuard {
    session: OwnedMutexGuard<Session>,
}

impl SessionGuard {
    pub fn history(&self) -> &[ChatMessage] {
        &self.session.history
    }

    /// Replace the stored history and release the session.
    pub fn commit(mut self, history: Vec<ChatMessage>) {
        self.session.history = history;
        self.session.last_active = Instant::now();
    }
}

impl SessionStore {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// A fresh random session id.
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn is_expired(&self, slot: &Slot) -> bool {
        slot.try_lock()
            .map(|session| session.last_active.elapsed() > self.timeout)
            .unwrap_or(false)
    }

    /// Lock session `id` for a turn, creating it when absent or expired.
    pub async fn checkout(&self, id: &str) -> SessionGuard {
        let slot = {
            let mut sessions = self.sessions.write().await;
            if sessions.get(id).is_some_and(|slot| self.is_expired(slot)) {
                debug!(session_id = %id, "Session expired");
                sessions.remove(id);
            }
            sessions
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Session::new())))
                .clone()
        };

        let mut session = slot.lock_owned().await;
        session.last_active = Instant::now();
        SessionGuard { session }
    }

    /// Snapshot of a live session's history.
    ///
    /// Waits for a running turn on the session to finish.
    pub async fn history(&self, id: &str) -> Option<Vec<ChatMessage>> {
        let slot = self.sessions.read().await.get(id).cloned()?;
        let session = slot.lock().await;
        (session.last_active.elapsed() <= self.timeout).then(|| session.history.clone())
    }

    /// Drop every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, slot| !self.is_expired(slot));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Periodically purge expired sessions of the orchestrator behind `agent`.
///
/// Runs until the runtime shuts down.
pub fn spawn_session_reaper(
    agent: Arc<super::OrchestratorAgent>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Some(store) = agent.sessions() {
                let removed = store.purge_expired().await;
                if removed > 0 {
                    debug!(removed, "Purged expired sessions");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn committed_history_is_returned() {
        let store = SessionStore::new(Duration::from_secs(60));
        store
            .checkout("a")
            .await
            .commit(vec![ChatMessage::user("hi")]);

        assert_eq!(store.history("a").await.unwrap().len(), 1);
        assert_eq!(store.checkout("a").await.history().len(), 1);
        assert!(store.history("b").await.is_none());
    }

    #[tokio::test]
    async fn dropped_guard_keeps_previous_history() {
        let store = SessionStore::new(Duration::from_secs(60));
        store
            .checkout("a")
            .await
            .commit(vec![ChatMessage::user("hi")]);

        drop(store.checkout("a").await);

        assert_eq!(store.history("a").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn turns_on_one_session_are_serialized() {
        let store = Arc::new(SessionStore::new(Duration::from_secs(60)));
        let first = store.checkout("a").await;

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.checkout("a").await.history().len() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        first.commit(vec![ChatMessage::user("one"), ChatMessage::assistant("two")]);
        assert_eq!(waiter.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_millis(20));
        store.checkout("a").await.commit(vec![ChatMessage::user("hi")]);
        store.checkout("b").await.commit(vec![ChatMessage::user("hi")]);

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(store.checkout("a").await.history().is_empty());
        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn held_session_is_not_purged() {
        let store = SessionStore::new(Duration::from_millis(10));
        let guard = store.checkout("a").await;

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.purge_expired().await, 0);
        guard.commit(Vec::new());
    }

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(SessionStore::new_id(), SessionStore::new_id());
    }
}
