//! HTTP API server for Vantage gateway

pub mod context;
pub mod health;
pub mod websocket;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::context::ContextHandle;
use crate::db::DbPool;
use crate::viewport::ViewportSignals;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub db: DbPool,
    pub context: ContextHandle,
    /// Non-blocking sender for scroll/resize signals
    pub viewport: ViewportSignals,
}

/// Build the router with all routes and layers
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    let router = Router::new()
        .merge(context::router(state.clone()))
        .nest("/ws", websocket::router(state.clone()))
        .merge(health::router())
        .merge(health::ready_router(state));

    // CORS layer for cross-origin requests from the presentation shell
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server over the shared state
    #[must_use]
    pub const fn new(state: Arc<ApiState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
