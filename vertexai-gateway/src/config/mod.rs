use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Region used when `GOOGLE_CLOUD_LOCATION` is not set.
pub const DEFAULT_LOCATION: &str = "us-central1";

/// API version requested from the model endpoint.
pub const DEFAULT_API_VERSION: &str = "v1";

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// Cloud project that owns the Vertex AI quota.
    pub project_id: String,
    pub location: String,
    /// Path to a service-account key file.
    pub credentials_file: Option<String>,
    /// Gemini API key. When present it takes precedence over any other credential.
    pub api_key: Option<String>,
    pub api_version: String,
    /// Overrides the Google endpoint host, e.g. for a local stub.
    pub base_url: Option<String>,
}

impl GatewayConfig {
    /// Load settings from the process environment, after applying `.env`.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an environment snapshot.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let common = core_config::Config::with_port_override(lookup("PORT"))?;

        Ok(GatewayConfig {
            common,
            google: GoogleConfig::from_lookup(lookup)?,
        })
    }
}

impl GoogleConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(GoogleConfig {
            project_id: get_env(&lookup, "GOOGLE_CLOUD_PROJECT", None)?,
            location: get_env(&lookup, "GOOGLE_CLOUD_LOCATION", Some(DEFAULT_LOCATION))?,
            credentials_file: non_empty(&lookup, "GOOGLE_APPLICATION_CREDENTIALS"),
            api_key: non_empty(&lookup, "GEMINI_API_KEY"),
            api_version: get_env(&lookup, "GOOGLE_GENAI_API_VERSION", Some(DEFAULT_API_VERSION))?,
            base_url: non_empty(&lookup, "GOOGLE_GENAI_BASE_URL"),
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, key) {
        Some(val) => Ok(val),
        None => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}
