// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use replywise_core::types::{HealthStatus, ProcessOutcome, ProcessRequest, ReplyStatus};
use replywise_core::{PluginAdapter, ReplywiseError, ReviewStore};
use replywise_pipeline::{ImportBatcher, ImportReport, IngestOrigin, ReviewNotification};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Actor recorded when a publish request names nobody.
pub const DEFAULT_ACTOR: &str = "api";

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Response body for POST /v1/webhooks/reviews.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAccepted {
    pub created: bool,
    pub review_id: String,
    pub reply_status: ReplyStatus,
}

/// Response body for the per-review actions.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub review_id: String,
    pub reply_status: ReplyStatus,
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub actor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub text: String,
    pub author: String,
}

/// GET /health
///
/// Unauthenticated. Reports storage health and uptime.
pub async fn get_public_health(State(state): State<GatewayState>) -> Response {
    let uptime_secs = state.health.start_time.elapsed().as_secs();
    let (code, status) = match state.pipeline.store().health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("unhealthy: {reason}"),
        ),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {e}")),
    };
    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs,
    };
    (code, Json(body)).into_response()
}

/// GET /metrics
///
/// Unauthenticated Prometheus scrape endpoint. 404 when metrics are off.
pub async fn get_public_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// POST /v1/webhooks/reviews
///
/// Stores the notified review and, when it is new, runs the pipeline in
/// the background. Redeliveries are acknowledged without reprocessing.
pub async fn post_review_webhook(
    State(state): State<GatewayState>,
    Json(notification): Json<ReviewNotification>,
) -> Result<(StatusCode, Json<WebhookAccepted>), ApiError> {
    let (business_id, payload) = notification.into_payload()?;
    if business_id.trim().is_empty() {
        return Err(ReplywiseError::Config("notification has no business_id".to_string()).into());
    }
    state
        .pipeline
        .store()
        .get_business(&business_id)
        .await?
        .ok_or_else(|| ReplywiseError::not_found("business", &business_id))?;

    let outcome = state
        .dedup
        .ingest(&business_id, &payload, IngestOrigin::Webhook, false)
        .await?;
    let review_id = outcome.review.id.clone();

    if outcome.created {
        let pipeline = state.pipeline.clone();
        let id = review_id.clone();
        state.tasks.spawn(async move {
            if let Err(e) = pipeline.process_review(&id).await {
                tracing::warn!(review_id = id.as_str(), error = %e, "background processing failed");
            }
        });
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(WebhookAccepted {
            created: outcome.created,
            review_id,
            reply_status: outcome.review.reply_status,
        }),
    ))
}

/// POST /v1/reviews/process
///
/// Internal trigger: runs the pipeline synchronously and returns the status.
pub async fn post_process(
    State(state): State<GatewayState>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessOutcome>, ApiError> {
    Ok(Json(state.pipeline.process(&request).await?))
}

/// POST /v1/reviews/{id}/approve
pub async fn post_approve(
    State(state): State<GatewayState>,
    Path(review_id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let reply_status = state.pipeline.approve(&review_id).await?;
    Ok(Json(ActionResponse {
        review_id,
        reply_status,
    }))
}

/// POST /v1/reviews/{id}/publish
pub async fn post_publish(
    State(state): State<GatewayState>,
    Path(review_id): Path<String>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let actor = request
        .actor
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(DEFAULT_ACTOR);
    let reply_status = state.pipeline.publish(&review_id, actor).await?;
    Ok(Json(ActionResponse {
        review_id,
        reply_status,
    }))
}

/// POST /v1/reviews/{id}/reject
pub async fn post_reject(
    State(state): State<GatewayState>,
    Path(review_id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let reply_status = state.pipeline.reject(&review_id).await?;
    Ok(Json(ActionResponse {
        review_id,
        reply_status,
    }))
}

/// POST /v1/reviews/{id}/regenerate
pub async fn post_regenerate(
    State(state): State<GatewayState>,
    Path(review_id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let reply_status = state.pipeline.regenerate(&review_id).await?;
    Ok(Json(ActionResponse {
        review_id,
        reply_status,
    }))
}

/// POST /v1/reviews/{id}/draft
pub async fn post_draft(
    State(state): State<GatewayState>,
    Path(review_id): Path<String>,
    Json(body): Json<DraftRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let reply_status = state
        .pipeline
        .draft_manually(&review_id, &body.text, &body.author)
        .await?;
    Ok(Json(ActionResponse {
        review_id,
        reply_status,
    }))
}

/// POST /v1/businesses/{id}/import
///
/// Runs a historical import to completion and returns its report.
pub async fn post_import(
    State(state): State<GatewayState>,
    Path(business_id): Path<String>,
) -> Result<Json<ImportReport>, ApiError> {
    let importer = ImportBatcher::new(state.pipeline.clone(), state.import_settings);
    Ok(Json(importer.import_history(&business_id).await?))
}
