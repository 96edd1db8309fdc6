//! Inference backends and the engine trait the conversation manager calls.

pub mod inference;
pub mod ollama;
pub mod workers_ai;

pub use inference::{InferFuture, InferenceEngine, build_http_client, engine_from_config};
pub use ollama::OllamaChat;
pub use workers_ai::WorkersAi;
