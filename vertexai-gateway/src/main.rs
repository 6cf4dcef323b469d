use service_core::observability::{init_tracing, log_level_from};
use vertexai_gateway::config::GatewayConfig;
use vertexai_gateway::handlers::health::SERVICE_NAME;
use vertexai_gateway::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = log_level_from(|key| std::env::var(key).ok());
    init_tracing(SERVICE_NAME, &log_level);

    let config = GatewayConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to initialize gateway: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("HTTP server error: {}", e);
        e
    })?;

    tracing::info!("Server stopped");
    Ok(())
}
