//! Core configuration, error and identifier types.

pub mod config;
pub mod errors;
pub mod ids;

pub use config::{
    ChatConfig, InferenceBackend, InferenceConfig, ServerConfig, StorageConfig, StoreBackend,
};
pub use errors::{ChatError, ChatResult};
pub use ids::{DEFAULT_SESSION_ID, SessionId};
