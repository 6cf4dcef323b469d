use axum::{response::IntoResponse, Json};

use crate::models::HealthResponse;

pub const SERVICE_NAME: &str = "vertexai-gateway";

/// Liveness probe. Does not touch the model provider.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}
