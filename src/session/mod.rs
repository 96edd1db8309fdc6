//! Session-scoped conversation history.
//!
//! - `message`: roles and transcript entries
//! - `transcript`: preamble and size policy
//! - `normalize`: reply text extraction from raw inference responses
//! - `store`: per-session key-value persistence
//! - `manager`: one chat turn, end to end
//! - `router`: per-session dispatch and serialization

pub mod manager;
pub mod message;
pub mod normalize;
pub mod router;
pub mod store;
pub mod transcript;

pub use manager::{ChatReply, ConversationManager, TurnPhase};
pub use message::{InferenceMessage, Message, Role};
pub use normalize::extract_reply_text;
pub use router::SessionRouter;
pub use store::{
    HISTORY_KEY, InMemorySessionStore, SessionStore, SqliteSessionStore, StoreFuture,
};
pub use transcript::{HistoryPolicy, MAX_TRANSCRIPT_MESSAGES, SYSTEM_PROMPT, Transcript};
