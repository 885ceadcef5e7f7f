//! Birthday site library
//!
//! Data and endpoint layer for a single-page birthday microsite:
//! - `api`: the JSON endpoints and their router
//! - `sync`: resource hooks with remote-first, local-fallback loading
//! - `remote`: the managed backend client and the local SQLite backend
//! - `device`: viewport and network classification

pub mod api;
pub mod app;
pub mod config;
pub mod database;
pub mod device;
pub mod error;
pub mod preferences;
pub mod remote;
pub mod services;
pub mod storage;
pub mod sync;
pub mod validation;

use app::AppState;
use config::SiteConfig;
use error::Result;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

/// Build state from `config` and serve until ctrl-c or SIGTERM
pub async fn start_server(config: SiteConfig) -> Result<()> {
    info!("Initializing state...");
    let state = AppState::from_config(&config).await?;

    let app = api::router(state);

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
