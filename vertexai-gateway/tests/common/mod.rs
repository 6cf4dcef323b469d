#![allow(dead_code)]

use std::sync::Arc;

use service_core::config::Config as CoreConfig;
use vertexai_gateway::config::{GatewayConfig, GoogleConfig};
use vertexai_gateway::services::ContentProvider;
use vertexai_gateway::startup::Application;

pub fn test_config(port: u16) -> GatewayConfig {
    GatewayConfig {
        common: CoreConfig { port },
        google: GoogleConfig {
            project_id: "test-project".to_string(),
            location: "us-central1".to_string(),
            credentials_file: None,
            api_key: None,
            api_version: "v1".to_string(),
            base_url: None,
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the gateway on a random port around `provider`.
    pub async fn spawn(provider: Arc<dyn ContentProvider>) -> Self {
        let app = Application::build_with_provider(test_config(0), provider)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }
}
