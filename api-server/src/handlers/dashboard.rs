//! Dashboard handlers

use axum::{extract::State, Json};

use crate::AppState;
use crate::models::{DashboardData, SampleDashboard};

/// Mock history generated at startup
pub async fn data(State(state): State<AppState>) -> Json<DashboardData> {
    Json(state.dashboard.as_ref().clone())
}

/// Fresh sample series on every call
pub async fn sample() -> Json<SampleDashboard> {
    let mut rng = rand::thread_rng();
    Json(SampleDashboard::generate(chrono::Utc::now(), &mut rng))
}
