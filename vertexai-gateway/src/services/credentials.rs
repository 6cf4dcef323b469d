//! Google credential resolution and OAuth2 access tokens.
//!
//! Precedence: API key, then a service-account key file, then the ambient
//! service account exposed by the GCE / Cloud Run metadata server.

use crate::config::GoogleConfig;
use crate::services::providers::ProviderError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::fmt;
use std::fs;
use tokio::sync::Mutex;

/// OAuth2 scope accepted by the Vertex AI API.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime requested for service-account assertions (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The fields of a service-account key file the gateway needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid service account key: {}", e))
        })
    }

    pub fn from_file(path: &str) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to read credentials file {}: {}",
                path,
                e
            ))
        })?;
        Self::from_json(&raw)
    }
}

/// How the gateway authenticates to Google.
#[derive(Clone)]
pub enum Credentials {
    ApiKey(String),
    ServiceAccount(ServiceAccountKey),
    Ambient,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey(..)"),
            Credentials::ServiceAccount(key) => f.debug_tuple("ServiceAccount").field(key).finish(),
            Credentials::Ambient => f.write_str("Ambient"),
        }
    }
}

impl Credentials {
    pub fn resolve(config: &GoogleConfig) -> Result<Self, AppError> {
        if let Some(key) = &config.api_key {
            return Ok(Credentials::ApiKey(key.clone()));
        }

        if let Some(path) = &config.credentials_file {
            return Ok(Credentials::ServiceAccount(ServiceAccountKey::from_file(
                path,
            )?));
        }

        Ok(Credentials::Ambient)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::ApiKey(_) => "api_key",
            Credentials::ServiceAccount(_) => "service_account",
            Credentials::Ambient => "ambient",
        }
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

enum TokenOrigin {
    ServiceAccount {
        key: ServiceAccountKey,
        signing_key: EncodingKey,
    },
    Metadata {
        url: String,
    },
}

/// Mints and caches OAuth2 bearer tokens.
pub struct TokenSource {
    origin: TokenOrigin,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn service_account(key: ServiceAccountKey, client: Client) -> Result<Self, AppError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to parse service account private key: {}",
                e
            ))
        })?;

        Ok(Self {
            origin: TokenOrigin::ServiceAccount { key, signing_key },
            client,
            cached: Mutex::new(None),
        })
    }

    pub fn metadata_server(client: Client) -> Self {
        Self::metadata_server_at(METADATA_TOKEN_URL, client)
    }

    pub fn metadata_server_at(url: impl Into<String>, client: Client) -> Self {
        Self {
            origin: TokenOrigin::Metadata { url: url.into() },
            client,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid access token, fetching a new one when the cached token
    /// is missing or about to expire.
    pub async fn token(&self) -> Result<String, ProviderError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let response = self.fetch(now).await?;
        let expires_in = response.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        let token = CachedToken {
            value: response.access_token,
            expires_at: now + Duration::seconds(expires_in),
        };

        tracing::debug!(expires_at = %token.expires_at, "Refreshed access token");

        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch(&self, now: DateTime<Utc>) -> Result<TokenResponse, ProviderError> {
        let request = match &self.origin {
            TokenOrigin::ServiceAccount { key, signing_key } => {
                let claims = AssertionClaims {
                    iss: &key.client_email,
                    scope: CLOUD_PLATFORM_SCOPE,
                    aud: &key.token_uri,
                    iat: now.timestamp(),
                    exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
                };

                let mut header = Header::new(Algorithm::RS256);
                header.kid = key.private_key_id.clone();

                let assertion = encode(&header, &claims, signing_key).map_err(|e| {
                    ProviderError::Credentials(format!("Failed to sign assertion: {}", e))
                })?;

                self.client
                    .post(&key.token_uri)
                    .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            }
            TokenOrigin::Metadata { url } => {
                self.client.get(url).header("Metadata-Flavor", "Google")
            }
        };

        let response = request.send().await.map_err(|e| {
            ProviderError::Credentials(format!("Token request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Token request rejected");
            return Err(ProviderError::Credentials(format!(
                "Token endpoint returned {}",
                status
            )));
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            ProviderError::Credentials(format!("Failed to parse token response: {}", e))
        })
    }
}
