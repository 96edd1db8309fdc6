//! Transcript message model.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a transcript message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Behaviour-setting preamble.
    System,
    /// User input.
    User,
    /// Model reply.
    Assistant,
}

impl Role {
    /// Stable string form for storage and inference payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One transcript entry, as persisted and as returned by the history endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the content.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Unix timestamp in milliseconds.
    pub ts: i64,
}

impl Message {
    /// Build a message stamped with the current time.
    #[must_use]
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            ts: Utc::now().timestamp_millis(),
        }
    }

    /// Build a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::now(Role::System, content)
    }

    /// Build a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::now(Role::User, content)
    }

    /// Build an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(Role::Assistant, content)
    }
}

/// Role/content pair sent to the inference engine; timestamps stay local.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct InferenceMessage {
    /// Who produced the content.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl From<&Message> for InferenceMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}
