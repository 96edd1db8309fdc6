//! Process-local session store.

use dashmap::DashMap;
use serde_json::Value;

use crate::core::errors::ChatResult;
use crate::core::ids::SessionId;
use crate::session::store::{SessionStore, StoreFuture};

/// `DashMap`-backed store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: DashMap<(SessionId, String), Value>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values across all sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get<'a>(
        &'a self,
        session: &'a SessionId,
        key: &'a str,
    ) -> StoreFuture<'a, ChatResult<Option<Value>>> {
        Box::pin(async move {
            let value = self
                .entries
                .get(&(session.clone(), key.to_string()))
                .map(|entry| entry.value().clone());
            Ok(value)
        })
    }

    fn put<'a>(
        &'a self,
        session: &'a SessionId,
        key: &'a str,
        value: Value,
    ) -> StoreFuture<'a, ChatResult<()>> {
        Box::pin(async move {
            self.entries.insert((session.clone(), key.to_string()), value);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let store = InMemorySessionStore::new();
        let value = store.get(&SessionId::from("a"), "history").await;
        assert!(matches!(value, Ok(None)));
    }

    #[tokio::test]
    async fn test_put_overwrites_and_isolates_sessions() {
        let store = InMemorySessionStore::new();
        let a = SessionId::from("a");
        let b = SessionId::from("b");

        assert!(store.put(&a, "history", json!([1])).await.is_ok());
        assert!(store.put(&a, "history", json!([1, 2])).await.is_ok());

        assert_eq!(store.get(&a, "history").await.ok().flatten(), Some(json!([1, 2])));
        assert_eq!(store.get(&b, "history").await.ok().flatten(), None);
        assert_eq!(store.len(), 1);
    }
}
