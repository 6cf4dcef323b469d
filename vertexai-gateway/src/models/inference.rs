use serde::{Deserialize, Serialize};

/// Body of `POST /v1/inference`.
///
/// Only JSON type-correctness is checked. Missing strings decode as empty and
/// missing sampling parameters stay `None`, so nothing is invented on the
/// caller's behalf.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InferenceRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
