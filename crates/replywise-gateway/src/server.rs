// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use replywise_core::ReplywiseError;
use replywise_pipeline::{ImportSettings, IngestionDeduplicator, ReplyPipeline};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Health state for unauthenticated health/metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl HealthState {
    pub fn new(prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            prometheus_render,
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<ReplyPipeline>,
    pub dedup: IngestionDeduplicator,
    pub import_settings: ImportSettings,
    /// Background pipeline runs started by webhook deliveries.
    pub tasks: TaskTracker,
    pub auth: AuthConfig,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(
        pipeline: Arc<ReplyPipeline>,
        import_settings: ImportSettings,
        auth: AuthConfig,
        health: HealthState,
    ) -> Self {
        let dedup = IngestionDeduplicator::new(pipeline.store().clone());
        Self {
            pipeline,
            dedup,
            import_settings,
            tasks: TaskTracker::new(),
            auth,
            health,
        }
    }
}

/// Gateway server bind address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Builds the gateway router.
///
/// - GET /health, GET /metrics (public)
/// - POST /v1/webhooks/reviews
/// - POST /v1/reviews/process
/// - POST /v1/reviews/{id}/{approve,publish,reject,regenerate,draft}
/// - POST /v1/businesses/{id}/import
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .route("/metrics", get(handlers::get_public_metrics))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/webhooks/reviews", post(handlers::post_review_webhook))
        .route("/v1/reviews/process", post(handlers::post_process))
        .route("/v1/reviews/{id}/approve", post(handlers::post_approve))
        .route("/v1/reviews/{id}/publish", post(handlers::post_publish))
        .route("/v1/reviews/{id}/reject", post(handlers::post_reject))
        .route("/v1/reviews/{id}/regenerate", post(handlers::post_regenerate))
        .route("/v1/reviews/{id}/draft", post(handlers::post_draft))
        .route("/v1/businesses/{id}/import", post(handlers::post_import))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves the gateway until `shutdown` is cancelled, then waits for
/// background pipeline runs to finish.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ReplywiseError> {
    let tasks = state.tasks.clone();
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ReplywiseError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| ReplywiseError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tasks.close();
    tracing::info!(pending = tasks.len(), "waiting for background processing");
    tasks.wait().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }

    #[test]
    fn health_state_without_metrics() {
        let health = HealthState::new(None);
        assert!(health.prometheus_render.is_none());
    }
}
