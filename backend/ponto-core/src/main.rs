// src/main.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod messages;
mod punch_service;
mod record_store;
mod report_service;
mod time_utils;


use config::Config;
use record_store::{JsonFileRecordStore, MemoryRecordStore, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration from environment")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Tracing subscriber initialized.");

    let store = connect_store(&config)?;
    let app = api::build_router(api::AppState::new(store.clone()));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed");

    // Close the store even when the server stopped on an error.
    if let Err(e) = store.disconnect().await {
        error!("Failed to disconnect record store: {}", e);
    }
    info!("Server stopped.");

    served
}

fn connect_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    match &config.db_path {
        Some(path) => {
            let store = JsonFileRecordStore::connect(path)
                .with_context(|| format!("Failed to open record store at {:?}", path))?;
            Ok(Arc::new(store))
        }
        None => {
            info!("DB_PATH not set, keeping day records in memory.");
            Ok(Arc::new(MemoryRecordStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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
    info!("Shutdown signal received, draining connections...");
}
