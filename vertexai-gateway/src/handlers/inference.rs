use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use service_core::error::AppError;
use std::time::Instant;

use crate::models::{InferenceRequest, InferenceResponse};
use crate::services::GenerationParams;
use crate::startup::AppState;

/// Forward one prompt to the model provider and relay the generated text.
///
/// A body that does not decode is answered with 400 before the provider is
/// touched. Provider failures return early with an error status.
#[tracing::instrument(skip_all)]
pub async fn inference(
    State(state): State<AppState>,
    payload: Result<Json<InferenceRequest>, JsonRejection>,
) -> Result<Json<InferenceResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected inference request body");
        AppError::BadRequest(anyhow::anyhow!(rejection.body_text()))
    })?;

    let params = GenerationParams {
        temperature: request.temperature,
        max_output_tokens: request.max_tokens,
    };

    let started = Instant::now();
    let content = state
        .provider
        .generate_content(&request.model, &request.prompt, &params)
        .await
        .map_err(|e| {
            tracing::error!(
                provider = state.provider.name(),
                model = %request.model,
                error = %e,
                "Failed to generate content"
            );
            AppError::from(e)
        })?;

    tracing::info!(
        provider = state.provider.name(),
        model = %request.model,
        input_tokens = content.input_tokens,
        output_tokens = content.output_tokens,
        finish_reason = ?content.finish_reason,
        duration_ms = started.elapsed().as_millis() as u64,
        "Inference completed"
    );

    Ok(Json(InferenceResponse { text: content.text }))
}
