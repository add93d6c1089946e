//! amarr - Torznab adapter service
//!
//! This is the main entry point for the HTTP server.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use amarr::app::build_app;
use amarr::config::Config;
use amarr::indexer::IndexerRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amarr=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting amarr");

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let registry = IndexerRegistry::from_config(&config)?;
    if registry.is_empty() {
        tracing::warn!("No backends configured; only /healthz will answer");
    } else {
        tracing::info!(count = registry.len(), "Indexers registered");
    }

    let app = build_app(&registry);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await
        }
    }
}
