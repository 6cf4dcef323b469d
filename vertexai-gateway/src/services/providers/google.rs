//! Google GenAI provider implementation.
//!
//! Talks to the `generateContent` REST method on one of two backends:
//! the Gemini Developer API when an API key is configured, Vertex AI
//! otherwise (bearer token from a service account or the metadata server).

use super::{ContentProvider, FinishReason, GeneratedContent, GenerationParams, ProviderError};
use crate::config::GoogleConfig;
use crate::services::credentials::{Credentials, TokenSource};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

/// Gemini Developer API host.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

enum Backend {
    GeminiApi { api_key: String },
    VertexAi { tokens: TokenSource },
}

/// Google GenAI text provider.
pub struct GoogleGenAiProvider {
    config: GoogleConfig,
    backend: Backend,
    client: Client,
}

impl GoogleGenAiProvider {
    pub fn new(config: GoogleConfig, credentials: Credentials) -> Result<Self, AppError> {
        let client = Client::builder().build().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Failed to create HTTP client: {}", e))
        })?;

        let backend = match credentials {
            Credentials::ApiKey(api_key) => Backend::GeminiApi { api_key },
            Credentials::ServiceAccount(key) => Backend::VertexAi {
                tokens: TokenSource::service_account(key, client.clone())?,
            },
            Credentials::Ambient => Backend::VertexAi {
                tokens: TokenSource::metadata_server(client.clone()),
            },
        };

        Ok(Self {
            config,
            backend,
            client,
        })
    }

    /// Endpoint family in use, for logs.
    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::GeminiApi { .. } => "gemini-api",
            Backend::VertexAi { .. } => "vertex-ai",
        }
    }

    fn base_url(&self) -> String {
        if let Some(base) = &self.config.base_url {
            return base.trim_end_matches('/').to_string();
        }

        match self.backend {
            Backend::GeminiApi { .. } => GEMINI_API_BASE.to_string(),
            Backend::VertexAi { .. } if self.config.location == "global" => {
                "https://aiplatform.googleapis.com".to_string()
            }
            Backend::VertexAi { .. } => {
                format!("https://{}-aiplatform.googleapis.com", self.config.location)
            }
        }
    }

    /// Full `generateContent` URL for `model`.
    pub fn generate_url(&self, model: &str) -> String {
        let model_path = match self.backend {
            Backend::GeminiApi { .. } => gemini_model_path(model),
            Backend::VertexAi { .. } => {
                vertex_model_path(&self.config.project_id, &self.config.location, model)
            }
        };

        format!(
            "{}/{}/{}:generateContent",
            self.base_url(),
            self.config.api_version,
            model_path
        )
    }

    fn build_request(prompt: &str, params: &GenerationParams) -> GenerateContentRequest {
        let generation_config =
            if params.temperature.is_none() && params.max_output_tokens.is_none() {
                None
            } else {
                Some(GenerationConfig {
                    temperature: params.temperature,
                    max_output_tokens: params.max_output_tokens,
                })
            };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                    thought: None,
                }],
            }],
            generation_config,
        }
    }
}

/// Gemini API resource name: `models/{model}` unless already qualified.
fn gemini_model_path(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Vertex AI resource name. Bare names resolve to Google-published models.
fn vertex_model_path(project: &str, location: &str, model: &str) -> String {
    if model.starts_with("projects/") {
        model.to_string()
    } else if model.contains('/') {
        format!("projects/{}/locations/{}/{}", project, location, model)
    } else {
        format!(
            "projects/{}/locations/{}/publishers/google/models/{}",
            project, location, model
        )
    }
}

#[async_trait]
impl ContentProvider for GoogleGenAiProvider {
    fn name(&self) -> &str {
        self.backend_name()
    }

    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<GeneratedContent, ProviderError> {
        let request = Self::build_request(prompt, params);
        let url = self.generate_url(model);

        let builder = self.client.post(&url).json(&request);
        let builder = match &self.backend {
            Backend::GeminiApi { api_key } => builder.header("x-goog-api-key", api_key),
            Backend::VertexAi { tokens } => builder.bearer_auth(tokens.token().await?),
        };

        tracing::debug!(
            backend = self.backend_name(),
            model = %model,
            prompt_len = prompt.len(),
            "Sending request to Google GenAI"
        );

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited(message));
            }

            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if api_response.candidates.is_empty() {
            if let Some(reason) = api_response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_ref())
            {
                return Err(ProviderError::Blocked(reason.clone()));
            }
        }

        let usage = api_response.usage_metadata.clone().unwrap_or_default();

        Ok(GeneratedContent {
            text: api_response.text(),
            input_tokens: usage.prompt_token_count.unwrap_or(0),
            output_tokens: usage.candidates_token_count.unwrap_or(0),
            finish_reason: api_response.finish_reason(),
        })
    }
}

// ============================================================================
// Google GenAI Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, skipping thought parts.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| p.thought != Some(true))
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn finish_reason(&self) -> FinishReason {
        match self
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            Some("STOP") | None => FinishReason::Complete,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") | Some("SPII") => {
                FinishReason::ContentFilter
            }
            Some(_) => FinishReason::Other,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
