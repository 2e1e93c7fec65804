//! Model management handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};

use finance_ai_core::SuiteStatus;

use crate::{AppState, AppResult};
use crate::models::{FeatureImportanceResponse, RetrainRequest, RetrainResponse};

/// Training state, schemas and artifacts of every wrapper
pub async fn status(State(state): State<AppState>) -> AppResult<Json<SuiteStatus>> {
    Ok(Json(state.models.status()?))
}

/// Feature importances of the risk and delinquency classifiers
pub async fn importance(State(state): State<AppState>) -> AppResult<Json<FeatureImportanceResponse>> {
    let risk = state.models.risk().feature_importance()?;
    let delinquency = state.models.delinquency().feature_importance()?;
    Ok(Json(FeatureImportanceResponse { risk, delinquency }))
}

/// Retrain on fresh synthetic data and persist the artifacts
///
/// Readers keep serving the previous models until each wrapper is swapped.
pub async fn retrain(
    State(state): State<AppState>,
    req: Option<Json<RetrainRequest>>,
) -> AppResult<Json<RetrainResponse>> {
    let Json(req) = req.unwrap_or_default();
    let seed = req.seed.unwrap_or_else(rand::random);
    tracing::info!("Retraining models (seed {})", seed);

    let models = Arc::clone(&state.models);
    let started = Instant::now();
    tokio::task::spawn_blocking(move || models.retrain(seed)).await??;

    let duration_ms = started.elapsed().as_millis() as u64;
    tracing::info!("Retraining finished in {} ms", duration_ms);

    Ok(Json(RetrainResponse {
        status: "retrained",
        seed,
        source: state.models.source(),
        duration_ms,
    }))
}
