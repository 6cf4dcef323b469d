//! Mock provider implementation for testing.

use super::{ContentProvider, GeneratedContent, GenerationParams, ProviderError};
use async_trait::async_trait;
use std::sync::Mutex;

/// One recorded invocation of [`MockContentProvider::generate_content`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub params: GenerationParams,
}

enum Reply {
    Text(String),
    ApiError { status: u16, message: String },
}

/// Mock provider that replies with a fixed outcome and records every call.
pub struct MockContentProvider {
    reply: Reply,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockContentProvider {
    /// Always succeed with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Reply::Text(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail as if the upstream API returned `status`.
    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self {
            reply: Reply::ApiError {
                status,
                message: message.into(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ContentProvider for MockContentProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<GeneratedContent, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                model: model.to_string(),
                prompt: prompt.to_string(),
                params: params.clone(),
            });
        }

        match &self.reply {
            Reply::Text(text) => Ok(GeneratedContent::text(text.clone())),
            Reply::ApiError { status, message } => Err(ProviderError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}
