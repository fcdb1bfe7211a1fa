use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::startup::AppState;

/// Liveness endpoint; reports the responder's health.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.responder.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "chatbot-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "chatbot-service",
                "error": e.to_string()
            })),
        ),
    }
}

/// Readiness endpoint for K8s probes.
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match state.responder.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
