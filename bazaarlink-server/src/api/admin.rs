//! Operational endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};

use crate::{
    api::dto::{HealthResponse, MessageResponse},
    state::AppState,
};

/// Start similarity model retraining in the background
#[utoipa::path(
    post,
    path = "/admin/retrain-model",
    tag = "admin",
    responses(
        (status = 202, description = "Retraining started", body = MessageResponse)
    )
)]
pub async fn retrain_model(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<MessageResponse>) {
    // The run reports its own outcome through logs
    drop(state.engine.retrain_model());

    (
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Model retraining started in background")),
    )
}

/// Health check with model status
#[utoipa::path(
    get,
    path = "/health",
    tag = "admin",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Catalog unavailable", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let health = HealthResponse::from(state.engine.health().await);
    let status = if health.catalog_available {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}
