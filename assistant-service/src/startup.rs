//! Application startup and lifecycle management.

use crate::config::AssistantConfig;
use crate::handlers;
use crate::services::audit::{AuditLog, MemoryAuditLog, MongoAuditLog};
use crate::services::metrics;
use crate::services::providers::openai::{OpenAiConfig, OpenAiGenerationProvider};
use crate::services::providers::pinecone::{PineconeConfig, PineconeRetrievalProvider};
use crate::services::providers::{GenerationProvider, RetrievalProvider};
use axum::{
    Router,
    routing::{get, post},
};
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state: read-only configuration plus the
/// process-scoped, credential-keyed collaborator handles injected into
/// every request.
#[derive(Clone)]
pub struct AppState {
    pub config: AssistantConfig,
    pub audit: Arc<dyn AuditLog>,
    pub retrieval: Arc<dyn RetrievalProvider>,
    pub generation: Arc<dyn GenerationProvider>,
}

/// Build the HTTP router for the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(handlers::chat::chat))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: AssistantConfig) -> Result<Self, AppError> {
        metrics::init_metrics();

        let audit: Arc<dyn AuditLog> = if config.mongodb.uri.is_empty() {
            tracing::warn!("No MongoDB URI configured, using in-memory audit log");
            Arc::new(MemoryAuditLog::new())
        } else {
            let mongo = MongoAuditLog::connect(&config.mongodb.uri, &config.mongodb.database)
                .await
                .map_err(|e| AppError::AuditStoreError(anyhow::anyhow!(e.to_string())))?;
            mongo
                .initialize_indexes()
                .await
                .map_err(|e| AppError::AuditStoreError(anyhow::anyhow!(e.to_string())))?;
            Arc::new(mongo)
        };

        let retrieval: Arc<dyn RetrievalProvider> =
            Arc::new(PineconeRetrievalProvider::new(PineconeConfig {
                api_key: config.retrieval.api_key.clone(),
                base_url: config.retrieval.base_url.clone(),
                assistant_name: config.retrieval.assistant_name.clone(),
                price_per_million_tokens: config.pricing.retrieval_per_million,
                timeout_secs: config.retrieval.timeout_secs,
            }));
        tracing::info!(
            assistant = %config.retrieval.assistant_name,
            "Initialized retrieval provider"
        );

        let generation: Arc<dyn GenerationProvider> =
            Arc::new(OpenAiGenerationProvider::new(OpenAiConfig {
                api_key: config.generation.api_key.clone(),
                base_url: config.generation.base_url.clone(),
                model: config.generation.model.clone(),
                temperature: config.generation.temperature,
                timeout_secs: config.generation.timeout_secs,
            }));
        tracing::info!(
            model = %config.generation.model,
            "Initialized generation provider"
        );

        // Bind listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Assistant service listening on port {}", port);

        let state = AppState {
            config,
            audit,
            retrieval,
            generation,
        };

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
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
