//! DNA Predictor: HTTP scoring server.
//!
//! Loads the model artifacts once at startup and serves predictions until
//! interrupted. A missing or invalid model does not stop the server; scoring
//! requests fail until it is restarted with valid artifacts.

use std::sync::Arc;

use anyhow::{Context, Result};

use dna_predictor::adapters::fs::FsArtifactStore;
use dna_predictor::adapters::logistic::LogisticModel;
use dna_predictor::application::ScoringService;
use dna_predictor::config::{LogConfig, ServeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = dna_predictor::logging::init(&LogConfig::from_env_or_default())
        .context("Failed to initialise logging")?;

    let config = ServeConfig::from_env_or_default();
    tracing::info!(
        "Starting DNA predictor (model_dir={})...",
        config.model_dir.display()
    );

    let store = FsArtifactStore::new(&config.model_dir, &config.model_dir);
    let service = Arc::new(ScoringService::<LogisticModel>::load(&store));
    let app = dna_predictor::api::router(service);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("DNA predictor shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
