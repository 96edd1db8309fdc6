//! Startup helpers for the session chat server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::core::config::ChatConfig;
use crate::core::errors::ChatResult;
use crate::server::{self, AppState};

/// Run the server until Ctrl+C.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting session chat v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = rt.block_on(async {
        let state = initialize(&config).await?;
        server::run_server(state, config.server.port).await
    });

    if let Err(e) = result {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Read and validate configuration from the environment.
///
/// # Errors
/// Returns an error if a variable is malformed or a required one is missing.
pub fn load_config() -> ChatResult<ChatConfig> {
    let config = ChatConfig::from_env()?;
    config.validate()?;
    Ok(config)
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if the store or inference engine cannot be built.
pub async fn initialize(config: &ChatConfig) -> ChatResult<Arc<AppState>> {
    tracing::info!(
        backend = ?config.inference.backend,
        store = ?config.storage.backend,
        port = config.server.port,
        "initializing session chat"
    );
    AppState::from_config(config).await
}
