//! Finance AI HTTP API
//!
//! Serves the fraud, risk and delinquency models from `finance-ai-core`
//! plus the mock dashboard series used by the front-end.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   FINANCE AI API                     │
//! ├──────────────────────────────────────────────────────┤
//! │  Router (Axum) ── Cors / Trace / Compression layers  │
//! │        │                                             │
//! │        ▼                                             │
//! │  AppState { config, models, dashboard }              │
//! │        │                                             │
//! │        ▼                                             │
//! │  ModelSuite (RwLock per wrapper) ── models/ on disk  │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;


use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use finance_ai_core::ModelSuite;

pub use config::Config;
pub use error::{AppError, AppResult};
use models::DashboardData;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub models: Arc<ModelSuite>,
    pub dashboard: Arc<DashboardData>,
}

impl AppState {
    /// Dashboard history is drawn once here, seeded from the model seed
    pub fn new(config: Config, models: Arc<ModelSuite>) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(models.config().seed);
        let dashboard = DashboardData::generate(chrono::Utc::now(), &mut rng);
        Self {
            config,
            models,
            dashboard: Arc::new(dashboard),
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/api/health", get(handlers::health::check))
        .route("/api/dashboard/data", get(handlers::dashboard::data))
        .route("/dashboard", get(handlers::dashboard::sample))
        .route("/api/transactions", post(handlers::transactions::create));

    let model_routes = Router::new()
        .route("/detect/fraud", post(handlers::analysis::detect_fraud))
        .route("/analyze/risk", post(handlers::analysis::analyze_risk))
        .route("/predict/delinquency", post(handlers::analysis::predict_delinquency))

        // Management
        .route("/api/models/status", get(handlers::models::status))
        .route("/api/models/importance", get(handlers::models::importance))
        .route("/api/models/retrain", post(handlers::models::retrain));

    Router::new()
        .merge(public_routes)
        .merge(model_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
