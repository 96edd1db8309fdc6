//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::core::config::{ChatConfig, StoreBackend};
use crate::core::errors::ChatResult;
use crate::llm::inference::{InferenceEngine, engine_from_config};
use crate::session::router::SessionRouter;
use crate::session::store::{InMemorySessionStore, SessionStore, SqliteSessionStore};
use crate::session::transcript::HistoryPolicy;

/// Shared application state.
pub struct AppState {
    /// Per-session dispatch.
    pub router: SessionRouter,
}

impl AppState {
    /// Wire storage and inference from configuration.
    ///
    /// # Errors
    /// Returns an error if the store cannot be opened or the engine cannot be built.
    pub async fn from_config(config: &ChatConfig) -> ChatResult<Arc<Self>> {
        let store: Arc<dyn SessionStore> = match config.storage.backend {
            StoreBackend::Memory => Arc::new(InMemorySessionStore::new()),
            StoreBackend::Sqlite => Arc::new(SqliteSessionStore::new(&config.storage).await?),
        };
        tracing::info!(backend = ?config.storage.backend, "session store ready");

        let engine = engine_from_config(&config.inference)?;
        Ok(Self::new(store, engine, HistoryPolicy::default()))
    }

    /// Build state from already-constructed parts.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        engine: Arc<dyn InferenceEngine>,
        policy: HistoryPolicy,
    ) -> Arc<Self> {
        Arc::new(Self {
            router: SessionRouter::new(store, engine, policy),
        })
    }
}
