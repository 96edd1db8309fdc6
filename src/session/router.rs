//! Session router: resolves a session id to its conversation manager.
//!
//! Requests for one session id are serialized through an async mutex; ids do
//! not share any lock, so different sessions proceed in parallel. Each request
//! runs on its own task, so a dropped client connection does not cancel an
//! in-flight storage write or inference call.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::errors::ChatResult;
use crate::core::ids::SessionId;
use crate::llm::inference::InferenceEngine;
use crate::session::manager::{ChatReply, ConversationManager};
use crate::session::message::Message;
use crate::session::store::SessionStore;
use crate::session::transcript::HistoryPolicy;

type SessionHandle = Arc<Mutex<ConversationManager>>;

/// Dispatches chat and history requests to per-session managers.
#[derive(Clone)]
pub struct SessionRouter {
    sessions: Arc<DashMap<SessionId, SessionHandle>>,
    store: Arc<dyn SessionStore>,
    engine: Arc<dyn InferenceEngine>,
    policy: Arc<HistoryPolicy>,
}

impl SessionRouter {
    /// Create a router over shared storage and inference.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        engine: Arc<dyn InferenceEngine>,
        policy: HistoryPolicy,
    ) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            store,
            engine,
            policy: Arc::new(policy),
        }
    }

    /// Run one chat turn on `session_id`.
    ///
    /// # Errors
    /// Returns the manager's error unchanged, or a join error if the turn task failed.
    pub async fn chat(&self, session_id: SessionId, text: String) -> ChatResult<ChatReply> {
        let router = self.clone();
        tokio::spawn(async move {
            let handle = router.acquire(&session_id);
            let result = {
                let mut manager = handle.lock().await;
                manager.chat(&text).await
            };
            router.release(&session_id, handle);
            result
        })
        .await?
    }

    /// Fetch the persisted transcript of `session_id`.
    ///
    /// # Errors
    /// Returns the manager's error unchanged, or a join error if the task failed.
    pub async fn history(&self, session_id: SessionId) -> ChatResult<Vec<Message>> {
        let router = self.clone();
        tokio::spawn(async move {
            let handle = router.acquire(&session_id);
            let result = {
                let manager = handle.lock().await;
                manager.history().await
            };
            router.release(&session_id, handle);
            result
        })
        .await?
    }

    /// Number of sessions with a request running or queued.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn acquire(&self, session_id: &SessionId) -> SessionHandle {
        let entry = self.sessions.entry(session_id.clone()).or_insert_with(|| {
            debug!(session = %session_id, "opening session handle");
            Arc::new(Mutex::new(ConversationManager::new(
                session_id.clone(),
                Arc::clone(&self.store),
                Arc::clone(&self.engine),
                Arc::clone(&self.policy),
            )))
        });
        Arc::clone(entry.value())
    }

    // Holders clone under the shard lock, so a count of one here means no
    // request holds or waits on this handle.
    fn release(&self, session_id: &SessionId, handle: SessionHandle) {
        drop(handle);
        if self
            .sessions
            .remove_if(session_id, |_, handle| Arc::strong_count(handle) == 1)
            .is_some()
        {
            debug!(session = %session_id, "closed idle session handle");
        }
    }
}
