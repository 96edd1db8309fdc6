//! Per-session conversation manager.
//!
//! A manager owns one session's transcript for the duration of a request:
//! it loads the persisted value, applies the preamble and size policy, makes
//! a single inference round-trip and writes the whole transcript back. The
//! caller guarantees that at most one request per session runs at a time.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::errors::{ChatError, ChatResult};
use crate::core::ids::SessionId;
use crate::llm::inference::InferenceEngine;
use crate::session::message::{Message, Role};
use crate::session::normalize::extract_reply_text;
use crate::session::store::{HISTORY_KEY, SessionStore};
use crate::session::transcript::{HistoryPolicy, Transcript};

/// Reply returned to the chat endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Normalized assistant text.
    pub text: String,
}

/// Phase of an in-flight chat turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TurnPhase {
    /// No request running.
    Idle,
    /// Reading the persisted transcript.
    AwaitingHistory,
    /// Waiting on the inference engine.
    AwaitingInference,
    /// Writing the updated transcript.
    Persisting,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::AwaitingHistory => "awaiting_history",
            Self::AwaitingInference => "awaiting_inference",
            Self::Persisting => "persisting",
        };
        f.write_str(label)
    }
}

/// Conversation manager bound to one session id.
pub struct ConversationManager {
    session_id: SessionId,
    store: Arc<dyn SessionStore>,
    engine: Arc<dyn InferenceEngine>,
    policy: Arc<HistoryPolicy>,
    phase: TurnPhase,
}

impl ConversationManager {
    /// Create a manager for `session_id` over injected storage and inference.
    #[must_use]
    pub fn new(
        session_id: SessionId,
        store: Arc<dyn SessionStore>,
        engine: Arc<dyn InferenceEngine>,
        policy: Arc<HistoryPolicy>,
    ) -> Self {
        Self {
            session_id,
            store,
            engine,
            policy,
            phase: TurnPhase::Idle,
        }
    }

    /// Current turn phase.
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Persisted transcript in order; empty if nothing was stored yet.
    ///
    /// # Errors
    /// Returns an error if storage access fails or the stored value is not a transcript.
    pub async fn history(&self) -> ChatResult<Vec<Message>> {
        Ok(self.load_transcript().await?.into_messages())
    }

    /// Run one chat turn for `user_text` and persist the result.
    ///
    /// Nothing is written unless inference succeeds.
    ///
    /// # Errors
    /// Returns an error if storage access or the inference call fails.
    pub async fn chat(&mut self, user_text: &str) -> ChatResult<ChatReply> {
        let result = self.run_turn(user_text).await;
        if let Err(err) = &result {
            warn!(session = %self.session_id, phase = %self.phase, "chat turn failed: {err}");
        }
        self.enter(TurnPhase::Idle);
        result
    }

    async fn run_turn(&mut self, user_text: &str) -> ChatResult<ChatReply> {
        self.enter(TurnPhase::AwaitingHistory);
        let mut transcript = self.load_transcript().await?;

        if transcript.ensure_system_prompt(&self.policy.system_prompt) {
            debug!(session = %self.session_id, "inserted system preamble");
        }
        transcript.push(Message::user(user_text));

        self.enter(TurnPhase::AwaitingInference);
        let response = self.engine.run(&transcript.inference_messages()).await?;
        let text = extract_reply_text(&response);

        transcript.push(Message::assistant(text.clone()));
        let dropped = transcript.truncate_to(self.policy.max_messages);

        self.enter(TurnPhase::Persisting);
        let value = serde_json::to_value(&transcript)?;
        self.store.put(&self.session_id, HISTORY_KEY, value).await?;

        info!(
            session = %self.session_id,
            model = self.engine.model(),
            messages = transcript.len(),
            dropped,
            "chat turn persisted"
        );
        Ok(ChatReply { text })
    }

    async fn load_transcript(&self) -> ChatResult<Transcript> {
        let Some(value) = self.store.get(&self.session_id, HISTORY_KEY).await? else {
            return Ok(Transcript::default());
        };
        let transcript: Transcript = serde_json::from_value(value).map_err(|err| {
            ChatError::InvalidTranscript(format!("session {}: {err}", self.session_id))
        })?;
        if transcript.messages().first().is_some_and(|m| m.role != Role::System) {
            debug!(session = %self.session_id, "stored transcript lacks a system preamble");
        }
        Ok(transcript)
    }

    fn enter(&mut self, phase: TurnPhase) {
        debug!(session = %self.session_id, from = %self.phase, to = %phase, "turn phase");
        self.phase = phase;
    }
}
