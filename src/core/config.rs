//! Configuration for the chat relay.
//!
//! Values come from `SESSION_CHAT_*` environment variables with defaults that
//! match a local, in-memory deployment against Workers AI.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::errors::{ChatError, ChatResult};

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Hosted model the relay was built against.
pub const WORKERS_AI_MODEL: &str = "@cf/meta/llama-3.3-70b-instruct-fp8-fast";
/// Workers AI REST API root.
pub const WORKERS_AI_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
/// Model name as installed in Ollama.
pub const OLLAMA_MODEL: &str = "mistral:7b-instruct-q8_0";
/// Default Ollama API root.
pub const OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";

const ENV_PORT: &str = "SESSION_CHAT_PORT";
const ENV_BACKEND: &str = "SESSION_CHAT_BACKEND";
const ENV_BASE_URL: &str = "SESSION_CHAT_BASE_URL";
const ENV_MODEL: &str = "SESSION_CHAT_MODEL";
const ENV_ACCOUNT_ID: &str = "SESSION_CHAT_ACCOUNT_ID";
const ENV_API_TOKEN: &str = "SESSION_CHAT_API_TOKEN";
const ENV_TIMEOUT_SECS: &str = "SESSION_CHAT_TIMEOUT_SECS";
const ENV_STORE: &str = "SESSION_CHAT_STORE";
const ENV_SQLITE_PATH: &str = "SESSION_CHAT_SQLITE_PATH";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Inference backend settings.
    pub inference: InferenceConfig,
    /// Transcript storage settings.
    pub storage: StorageConfig,
}

impl ChatConfig {
    /// Build a configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value.
    pub fn from_env() -> ChatResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> ChatResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup(ENV_PORT) {
            config.server.port = parse_var(ENV_PORT, &port)?;
        }
        if let Some(backend) = lookup(ENV_BACKEND) {
            config.inference.backend = parse_var(ENV_BACKEND, &backend)?;
        }
        config.inference.base_url = lookup(ENV_BASE_URL);
        config.inference.model = lookup(ENV_MODEL);
        config.inference.account_id = lookup(ENV_ACCOUNT_ID);
        config.inference.api_token = lookup(ENV_API_TOKEN);
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            config.inference.timeout_secs = parse_var(ENV_TIMEOUT_SECS, &timeout)?;
        }
        if let Some(store) = lookup(ENV_STORE) {
            config.storage.backend = parse_var(ENV_STORE, &store)?;
        }
        if let Some(path) = lookup(ENV_SQLITE_PATH) {
            config.storage.sqlite_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or missing.
    pub fn validate(&self) -> ChatResult<()> {
        if self.inference.timeout_secs == 0 {
            return Err(ChatError::InvalidConfig(
                "inference.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.inference.effective_model().trim().is_empty() {
            return Err(ChatError::InvalidConfig(
                "inference.model must not be empty".to_string(),
            ));
        }

        Url::parse(self.inference.effective_base_url())?;

        if self.inference.backend == InferenceBackend::WorkersAi {
            if self.inference.account_id.as_deref().is_none_or(str::is_empty) {
                return Err(ChatError::InvalidConfig(format!(
                    "{ENV_ACCOUNT_ID} is required for the workers_ai backend"
                )));
            }
            if self.inference.api_token.as_deref().is_none_or(str::is_empty) {
                return Err(ChatError::InvalidConfig(format!(
                    "{ENV_API_TOKEN} is required for the workers_ai backend"
                )));
            }
        }

        if self.storage.backend == StoreBackend::Sqlite
            && self.storage.sqlite_path.as_os_str().is_empty()
        {
            return Err(ChatError::InvalidConfig(
                "storage.sqlite_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T>(key: &str, raw: &str) -> ChatResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|err| ChatError::InvalidConfig(format!("{key}={raw}: {err}")))
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Inference backend selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceBackend {
    /// Cloudflare Workers AI REST endpoint.
    WorkersAi,
    /// Ollama chat endpoint.
    Ollama,
}

impl FromStr for InferenceBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "workers_ai" => Ok(Self::WorkersAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(format!("unknown inference backend `{other}`")),
        }
    }
}

/// Inference settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Which backend serves completions.
    pub backend: InferenceBackend,
    /// Optional base URL override.
    pub base_url: Option<String>,
    /// Optional model override.
    pub model: Option<String>,
    /// Workers AI account id.
    pub account_id: Option<String>,
    /// Workers AI API token.
    pub api_token: Option<String>,
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: InferenceBackend::WorkersAi,
            base_url: None,
            model: None,
            account_id: None,
            api_token: None,
            timeout_secs: 120,
            connect_timeout_secs: 10,
        }
    }
}

impl InferenceConfig {
    /// Base URL in effect for the selected backend.
    #[must_use]
    pub fn effective_base_url(&self) -> &str {
        match (&self.base_url, self.backend) {
            (Some(url), _) => url,
            (None, InferenceBackend::WorkersAi) => WORKERS_AI_BASE_URL,
            (None, InferenceBackend::Ollama) => OLLAMA_BASE_URL,
        }
    }

    /// Model identifier in effect for the selected backend.
    #[must_use]
    pub fn effective_model(&self) -> &str {
        match (&self.model, self.backend) {
            (Some(model), _) => model,
            (None, InferenceBackend::WorkersAi) => WORKERS_AI_MODEL,
            (None, InferenceBackend::Ollama) => OLLAMA_MODEL,
        }
    }

    /// Overall request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Transcript store selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local map; lost on restart.
    Memory,
    /// `SQLite` file.
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

/// Storage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which store keeps transcripts.
    pub backend: StoreBackend,
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// Session key-value table name.
    pub table: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            sqlite_path: PathBuf::from("session_chat.sqlite"),
            table: "session_kv".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ChatConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.inference.backend, InferenceBackend::WorkersAi);
        assert_eq!(config.inference.effective_model(), WORKERS_AI_MODEL);
        assert_eq!(config.storage.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_workers_ai_requires_credentials() {
        let config = ChatConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ChatError::InvalidConfig(_))
        ));

        let config = ChatConfig::from_lookup(lookup_from(&[
            ("SESSION_CHAT_ACCOUNT_ID", "acct"),
            ("SESSION_CHAT_API_TOKEN", "token"),
        ]));
        assert!(config.is_ok_and(|c| c.validate().is_ok()));
    }

    #[test]
    fn test_ollama_from_lookup() {
        let config = ChatConfig::from_lookup(lookup_from(&[
            ("SESSION_CHAT_BACKEND", "ollama"),
            ("SESSION_CHAT_PORT", "8080"),
            ("SESSION_CHAT_STORE", "sqlite"),
            ("SESSION_CHAT_SQLITE_PATH", "/tmp/chat.sqlite"),
        ]))
        .unwrap_or_default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.inference.backend, InferenceBackend::Ollama);
        assert_eq!(config.inference.effective_base_url(), OLLAMA_BASE_URL);
        assert_eq!(config.inference.effective_model(), OLLAMA_MODEL);
        assert_eq!(config.storage.backend, StoreBackend::Sqlite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unparseable_values() {
        let result = ChatConfig::from_lookup(lookup_from(&[("SESSION_CHAT_PORT", "nope")]));
        assert!(matches!(result, Err(ChatError::InvalidConfig(_))));

        let result = ChatConfig::from_lookup(lookup_from(&[("SESSION_CHAT_BACKEND", "gpt")]));
        assert!(matches!(result, Err(ChatError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = ChatConfig::from_lookup(lookup_from(&[
            ("SESSION_CHAT_BACKEND", "ollama"),
            ("SESSION_CHAT_BASE_URL", "not a url"),
        ]))
        .unwrap_or_default();
        assert!(matches!(config.validate(), Err(ChatError::Url(_))));
    }
}
