//! Model provider abstractions and implementations.
//!
//! The gateway only depends on [`ContentProvider`], so the Google client can
//! be swapped for the recording mock in tests.

pub mod google;
pub mod mock;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No usable access token could be obtained.
    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Prompt blocked: {0}")]
    Blocked(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Credentials(msg) => AppError::ConfigError(anyhow::anyhow!(msg)),
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

/// Sampling parameters forwarded to the model. `None` leaves the model default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<i32>,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Other,
}

/// Result of a successful generate call.
#[derive(Debug, Clone)]
pub struct GeneratedContent {
    pub text: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub finish_reason: FinishReason,
}

impl GeneratedContent {
    /// Plain text result with no usage information.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_tokens: 0,
            output_tokens: 0,
            finish_reason: FinishReason::Complete,
        }
    }
}

/// The external "generate content" capability.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Run one generation with `model` over a single-turn `prompt`.
    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<GeneratedContent, ProviderError>;
}
