// Server startup: build the store, bind, serve until a shutdown signal arrives
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;

use crate::app::api::{router, AppState};
use crate::app::config::{ConfigError, ServerConfig};
use crate::app::storage::{StoreError, TaskStore};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize task store: {0}")]
    Store(#[from] StoreError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Create the application state for a config, seeding sample data when asked to
pub fn build_state(config: &ServerConfig) -> Result<AppState, StoreError> {
    let store = TaskStore::open_in_memory()?;
    if config.seed_sample_tasks {
        let seeded = store.seed_sample_tasks()?;
        tracing::info!(count = seeded.len(), "In-memory database initialized with sample tasks");
    }
    Ok(AppState::new(store))
}

pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let address = config.address()?;
    let state = build_state(&config)?;

    let listener = TcpListener::bind(address).await?;
    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

// Completes on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
