//! Application startup and lifecycle management.
//!
//! Wires the model provider into the HTTP router, binds the listener and runs
//! the server until SIGINT/SIGTERM.

use crate::config::GatewayConfig;
use crate::handlers::{health_check, inference, not_found};
use crate::services::providers::google::GoogleGenAiProvider;
use crate::services::{ContentProvider, Credentials};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ContentProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self { provider }
    }
}

/// Build the router with both endpoints and the request middleware stack.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/inference", post(inference))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the Google provider selected by `config`.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let credentials = Credentials::resolve(&config.google).map_err(|e| {
            tracing::error!("Failed to resolve Google credentials: {}", e);
            e
        })?;

        let provider = GoogleGenAiProvider::new(config.google.clone(), credentials.clone())?;

        tracing::info!(
            backend = provider.backend_name(),
            credentials = credentials.kind(),
            project = %config.google.project_id,
            location = %config.google.location,
            api_version = %config.google.api_version,
            "Initialized Google GenAI provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: GatewayConfig,
        provider: Arc<dyn ContentProvider>,
    ) -> Result<Self, AppError> {
        let router = build_router(AppState::new(provider));

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Vertex AI gateway listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve requests until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
