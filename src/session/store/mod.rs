//! Per-session key-value storage for transcripts.

pub mod memory_store;
pub mod sqlite_store;

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::core::errors::ChatResult;
use crate::core::ids::SessionId;

pub use memory_store::InMemorySessionStore;
pub use sqlite_store::SqliteSessionStore;

/// Key under which a session's transcript is stored.
pub const HISTORY_KEY: &str = "history";

/// Boxed future type for session store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Key-value store scoped per session. Keys of different sessions never alias.
pub trait SessionStore: Send + Sync {
    /// Read a value; `None` if it was never written.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn get<'a>(
        &'a self,
        session: &'a SessionId,
        key: &'a str,
    ) -> StoreFuture<'a, ChatResult<Option<Value>>>;

    /// Replace a value in a single write.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn put<'a>(
        &'a self,
        session: &'a SessionId,
        key: &'a str,
        value: Value,
    ) -> StoreFuture<'a, ChatResult<()>>;
}
