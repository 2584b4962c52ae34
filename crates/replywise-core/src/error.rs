// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Replywise review reply pipeline.

use strum::Display;
use thiserror::Error;

/// Classification of a failed reply publish against the review platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PublishErrorKind {
    /// Token refresh was rejected or the platform answered 401/403.
    Unauthorized,
    /// The review no longer exists on the platform.
    NotFound,
    /// The platform throttled the request (429).
    RateLimited,
    /// Any other 4xx response; the reply itself was refused.
    Rejected,
    /// The platform failed with a 5xx response.
    Upstream,
    /// Connection failure or timeout. Slow and down are not distinguished.
    Transport,
}

/// The primary error type used across all Replywise crates.
#[derive(Debug, Error)]
pub enum ReplywiseError {
    /// Configuration errors (missing StarConfig entry, missing refresh token, bad settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The text-generation backend failed, timed out, or returned nothing usable.
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The review platform refused or did not acknowledge a reply post.
    #[error("publish error ({kind}): {message}")]
    Publish {
        kind: PublishErrorKind,
        message: String,
    },

    /// Network or listing failures outside the publish path.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The user's monthly reply allowance is used up.
    #[error("monthly reply quota exceeded ({current}/{limit})")]
    QuotaExceeded { current: u64, limit: u32 },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A reply status change that the state machine does not allow.
    #[error("invalid reply transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    /// Token sealing or opening failed.
    #[error("vault error: {0}")]
    Vault(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ReplywiseError {
    /// Shorthand for a missing entity.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns true for errors that belong to a single review and must be
    /// recorded as a terminal status on it rather than aborting the caller.
    pub fn is_review_local(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Generation { .. }
                | Self::Publish { .. }
                | Self::QuotaExceeded { .. }
                | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_error_display_includes_kind() {
        let err = ReplywiseError::Publish {
            kind: PublishErrorKind::RateLimited,
            message: "slow down".into(),
        };
        assert_eq!(err.to_string(), "publish error (rate_limited): slow down");
    }

    #[test]
    fn review_local_classification() {
        assert!(ReplywiseError::Config("missing star config".into()).is_review_local());
        assert!(
            ReplywiseError::Generation {
                message: "empty".into(),
                source: None
            }
            .is_review_local()
        );
        assert!(!ReplywiseError::not_found("business", "b1").is_review_local());
        assert!(
            !ReplywiseError::Storage {
                source: "disk full".into()
            }
            .is_review_local()
        );
    }
}
