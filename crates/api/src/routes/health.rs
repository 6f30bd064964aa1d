use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use copydesk_store::StatusCounts;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model: String,
    projects: StatusCounts,
    in_flight: usize,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: state.config.pipeline.model.clone(),
        projects: state.store.status_counts().await,
        in_flight: state.runner.in_flight().await,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
