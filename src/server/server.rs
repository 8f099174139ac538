//! Debate API HTTP server with axum router and graceful shutdown.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::debate::DebateEngine;

use super::handlers::{get_health, post_judge, post_start, post_step_stream, AppState};

/// HTTP server exposing the debate engine.
pub struct DebateServer {
    /// Server configuration.
    config: ServerConfig,
    /// Application state shared across handlers.
    state: AppState,
    /// Cancellation token for graceful shutdown.
    cancel: CancellationToken,
}

impl DebateServer {
    /// Create a new server over an engine with default configuration.
    #[must_use]
    pub fn new(engine: Arc<DebateEngine>) -> Self {
        Self {
            config: ServerConfig::default(),
            state: AppState::new(engine),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the server configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Token that triggers graceful shutdown when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Build the axum router with all routes and middleware.
    #[must_use]
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(get_health))
            .route("/debate/start", post(post_start))
            .route("/debate/step_stream", post(post_step_stream))
            .route("/debate/judge", post(post_judge))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the server, binding to the configured address.
    ///
    /// The server runs until the cancellation token is triggered, then
    /// shuts down gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.address();
        let cancel = self.cancel.clone();
        let app = self.build_router();

        tracing::info!(address = %addr, "Starting debate API server");

        let listener = TcpListener::bind(&addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("Debate API server shutting down gracefully");
            })
            .await
    }
}
