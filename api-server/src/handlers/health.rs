//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: String,
    models_trained: bool,
    timestamp: String,
}

#[derive(Serialize)]
pub struct RootResponse {
    name: String,
    version: String,
    status: &'static str,
    docs_url: &'static str,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: state.config.version.clone(),
        models_trained: state.models.is_trained(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        name: state.config.project_name.clone(),
        version: state.config.version.clone(),
        status: "online",
        docs_url: "/docs",
    })
}
