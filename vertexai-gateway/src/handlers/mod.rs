//! HTTP handlers for the gateway.

pub mod health;
pub mod inference;

use axum::http::Uri;
use service_core::error::AppError;

pub use health::health_check;
pub use inference::inference;

/// Fallback for unknown routes so every error body has the same JSON shape.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("No route for {}", uri.path()))
}
