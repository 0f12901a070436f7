//! HTTP server setup and routing

use crate::config::Config;
use crate::pipeline::Pipeline;
use amx_common::{Error, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
///
/// Holds nothing mutable: each request builds its own buffers and staging
/// area inside [`Pipeline::generate`].
#[derive(Clone)]
pub struct AppContext {
    pub pipeline: Arc<Pipeline>,
}

impl AppContext {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build the application router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))
        .route("/build_info", get(super::handlers::build_info))
        .route("/generate-audio", post(super::handlers::generate_audio))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` resolves.
pub async fn run<F>(config: &Config, ctx: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Config(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("amx-mixer listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, create_router(ctx))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
