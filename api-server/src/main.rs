//! Finance AI API server
//!
//! Loads model artifacts from `MODELS_DIR` (training and saving them on the
//! first run) and serves the analytics endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finance_ai_api::{create_router, AppState, Config};
use finance_ai_core::ModelSuite;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "finance_ai_api=debug,finance_ai_core=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let config = Config::from_env();
    let model_config = config.model_config();
    model_config.validate().context("invalid model configuration")?;

    tracing::info!("{} v{} starting...", config.project_name, config.version);
    tracing::info!("Models: {}", config.models_dir.display());

    // Load or train models off the async runtime
    let models_dir = config.models_dir.clone();
    let train_on_startup = config.train_on_startup;
    let suite = tokio::task::spawn_blocking(move || {
        if train_on_startup {
            tracing::info!("TRAIN_ON_STARTUP set, training on synthetic data");
            let suite = ModelSuite::new(model_config);
            suite.train_synthetic()?;
            suite.save(&models_dir)?;
            Ok(suite)
        } else {
            ModelSuite::load_or_train(&models_dir, model_config)
        }
    })
    .await
    .context("model startup task panicked")?
    .context("failed to prepare models")?;

    tracing::info!("Models ready ({:?})", suite.source());

    // Build application state
    let state = AppState::new(config.clone(), Arc::new(suite));

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.socket_addr().context("invalid HOST/PORT")?;
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
