//! Bounded rolling transcript with a pinned system preamble.

use serde::{Deserialize, Serialize};

use crate::session::message::{InferenceMessage, Message, Role};

/// Preamble inserted at the head of every transcript.
pub const SYSTEM_PROMPT: &str = "You are a concise, helpful assistant. Reply in the user's language.";

/// Maximum number of messages kept per session, system preamble included.
pub const MAX_TRANSCRIPT_MESSAGES: usize = 30;

/// Prompt and size policy applied on every chat turn.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistoryPolicy {
    /// System preamble content.
    pub system_prompt: String,
    /// Message cap, preamble included. Values below 2 are treated as 2.
    pub max_messages: usize,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_messages: MAX_TRANSCRIPT_MESSAGES,
        }
    }
}

/// Ordered messages for one session. Serializes as a plain JSON array.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Wrap an existing message list.
    #[must_use]
    pub const fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Borrow the messages in canonical order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Consume into the message list.
    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Number of messages.
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }

    /// Insert the preamble at index 0 unless the transcript already starts
    /// with a system message. Returns `true` when a preamble was inserted.
    pub fn ensure_system_prompt(&mut self, prompt: &str) -> bool {
        let has_preamble = self
            .messages
            .first()
            .is_some_and(|first| first.role == Role::System);
        if has_preamble {
            return false;
        }
        self.messages.insert(0, Message::system(prompt));
        true
    }

    /// Append a message at the tail.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Keep index 0 plus the most recent `max_messages - 1` entries once the
    /// transcript grows past `max_messages`. Returns how many were dropped.
    pub fn truncate_to(&mut self, max_messages: usize) -> usize {
        let max_messages = max_messages.max(2);
        let len = self.messages.len();
        if len <= max_messages {
            return 0;
        }
        let dropped = len - max_messages;
        self.messages.drain(1..=dropped);
        dropped
    }

    /// Role/content pairs for the inference call.
    #[must_use]
    pub fn inference_messages(&self) -> Vec<InferenceMessage> {
        self.messages.iter().map(InferenceMessage::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(role: Role, n: usize) -> Message {
        Message {
            role,
            content: format!("m{n}"),
            ts: i64::try_from(n).unwrap_or_default(),
        }
    }

    #[test]
    fn test_inserts_preamble_into_empty_transcript() {
        let mut transcript = Transcript::default();
        assert!(transcript.ensure_system_prompt(SYSTEM_PROMPT));
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].role, Role::System);
        assert_eq!(transcript.messages()[0].content, SYSTEM_PROMPT);
    }

    #[test]
    fn test_preamble_is_not_duplicated() {
        let mut transcript = Transcript::from_messages(vec![Message::system("custom")]);
        assert!(!transcript.ensure_system_prompt(SYSTEM_PROMPT));
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].content, "custom");
    }

    #[test]
    fn test_repairs_missing_preamble() {
        let mut transcript = Transcript::from_messages(vec![numbered(Role::User, 1)]);
        assert!(transcript.ensure_system_prompt(SYSTEM_PROMPT));
        assert_eq!(transcript.messages()[0].role, Role::System);
        assert_eq!(transcript.messages()[1].content, "m1");
    }

    #[test]
    fn test_truncate_keeps_preamble_and_tail() {
        let mut messages = vec![Message::system(SYSTEM_PROMPT)];
        messages.extend((1..=32).map(|n| numbered(Role::User, n)));
        let mut transcript = Transcript::from_messages(messages);

        let dropped = transcript.truncate_to(30);

        assert_eq!(dropped, 3);
        assert_eq!(transcript.len(), 30);
        assert_eq!(transcript.messages()[0].role, Role::System);
        assert_eq!(transcript.messages()[1].content, "m4");
        assert_eq!(transcript.messages()[29].content, "m32");
    }

    #[test]
    fn test_truncate_is_noop_at_cap() {
        let mut messages = vec![Message::system(SYSTEM_PROMPT)];
        messages.extend((1..=29).map(|n| numbered(Role::User, n)));
        let mut transcript = Transcript::from_messages(messages);
        assert_eq!(transcript.truncate_to(30), 0);
        assert_eq!(transcript.len(), 30);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let transcript = Transcript::from_messages(vec![numbered(Role::User, 7)]);
        let value = serde_json::to_value(&transcript).unwrap_or_default();
        assert_eq!(
            value,
            serde_json::json!([{"role": "user", "content": "m7", "ts": 7}])
        );
    }
}
