//! Inference engine abstraction.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;

use crate::core::config::{InferenceBackend, InferenceConfig};
use crate::core::errors::ChatResult;
use crate::llm::ollama::OllamaChat;
use crate::llm::workers_ai::WorkersAi;
use crate::session::message::InferenceMessage;

/// Boxed future type for inference calls.
pub type InferFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Hosted model capability: ordered role/content messages in, raw response
/// object out. Reply text is extracted by the caller.
pub trait InferenceEngine: Send + Sync {
    /// Run one completion over the full message list.
    ///
    /// # Errors
    /// Returns an error if the endpoint cannot be reached or reports failure.
    fn run<'a>(&'a self, messages: &'a [InferenceMessage]) -> InferFuture<'a, ChatResult<Value>>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// Build the shared async HTTP client with the configured timeouts.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn build_http_client(config: &InferenceConfig) -> ChatResult<Client> {
    let client = Client::builder()
        .connect_timeout(config.connect_timeout())
        .timeout(config.timeout())
        .build()?;
    Ok(client)
}

/// Build the engine selected by `config`.
///
/// # Errors
/// Returns an error if the client cannot be built or required settings are missing.
pub fn engine_from_config(config: &InferenceConfig) -> ChatResult<Arc<dyn InferenceEngine>> {
    let client = build_http_client(config)?;
    let engine: Arc<dyn InferenceEngine> = match config.backend {
        InferenceBackend::WorkersAi => Arc::new(WorkersAi::new(client, config)?),
        InferenceBackend::Ollama => Arc::new(OllamaChat::new(client, config)),
    };
    tracing::info!(
        backend = ?config.backend,
        model = engine.model(),
        base_url = config.effective_base_url(),
        "inference engine ready"
    );
    Ok(engine)
}
