//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared outbound transport and the Azure OpenAI client
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown coordinator fires

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ChatConfig, ServiceConfig};
use crate::context::CallContext;
use crate::http::handlers;
use crate::http::request::request_id_header;
use crate::lifecycle::Shutdown;
use crate::openai::AzureOpenAiClient;
use crate::transport::Transport;

/// Grace period between the per-call deadline and the hard layer timeout, so
/// handlers answer with their own 504 envelope first.
const LAYER_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build outbound transport: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: AzureOpenAiClient,
    pub chat: ChatConfig,
    pub shutdown: Shutdown,
    pub request_timeout: Duration,
}

impl AppState {
    /// Context for one inbound request: cancelled on shutdown, bounded by
    /// the configured request timeout.
    pub fn call_context(&self) -> CallContext {
        self.shutdown.context(self.request_timeout)
    }
}

/// HTTP server for the chat proxy.
pub struct HttpServer {
    router: Router,
    shutdown: Shutdown,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, shutdown: Shutdown) -> Result<Self, ServerError> {
        let transport = Transport::new(&config.transport)?;
        let client = AzureOpenAiClient::new(config.openai.clone(), transport);

        tracing::info!(
            endpoint = %config.openai.endpoint,
            chat_deployment = %config.openai.chat_deployment,
            embedding_deployment = %config.openai.embedding_deployment,
            "Azure OpenAI client ready"
        );

        let state = AppState {
            client,
            chat: config.chat.clone(),
            shutdown: shutdown.clone(),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, shutdown })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let layer_timeout = Duration::from_secs(config.timeouts.request_secs) + LAYER_TIMEOUT_GRACE;

        Router::new()
            .route("/chat", post(handlers::chat))
            .route("/embeddings", post(handlers::embeddings))
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(request_id_header()))
                    .layer(TimeoutLayer::new(layer_timeout)),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
