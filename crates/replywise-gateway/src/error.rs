// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of pipeline errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use replywise_core::ReplywiseError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Publish failure class, when the platform refused a reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A [`ReplywiseError`] returned from a handler.
#[derive(Debug)]
pub struct ApiError(pub ReplywiseError);

impl From<ReplywiseError> for ApiError {
    fn from(error: ReplywiseError) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ReplywiseError::NotFound { .. } => StatusCode::NOT_FOUND,
            ReplywiseError::InvalidTransition { .. } => StatusCode::CONFLICT,
            ReplywiseError::Config(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ReplywiseError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ReplywiseError::Publish { .. }
            | ReplywiseError::Transport { .. }
            | ReplywiseError::Generation { .. } => StatusCode::BAD_GATEWAY,
            ReplywiseError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ReplywiseError::Storage { .. }
            | ReplywiseError::Vault(_)
            | ReplywiseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = match &self.0 {
            ReplywiseError::Publish { kind, .. } => Some(kind.to_string()),
            _ => None,
        };
        // Internal details stay in the log.
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "internal error".to_string()
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "request rejected");
            self.0.to_string()
        };
        (status, Json(ErrorResponse { error, kind })).into_response()
    }
}
