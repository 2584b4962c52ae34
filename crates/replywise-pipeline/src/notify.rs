// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply notifiers.
//!
//! The pipeline notifies after a round ends in `pending` or `posted`.
//! Delivery failures are logged by the caller and never change the
//! review's status.

use std::time::Duration;

use async_trait::async_trait;
use replywise_core::types::{AdapterType, HealthStatus, ReplyNotice};
use replywise_core::{PluginAdapter, ReplyNotifier, ReplywiseError};
use tracing::{debug, info};

/// POSTs each notice as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ReplywiseError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReplywiseError::Transport {
                message: format!("failed to build notifier HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook-notifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplywiseError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReplywiseError> {
        Ok(())
    }
}

#[async_trait]
impl ReplyNotifier for WebhookNotifier {
    async fn notify(&self, notice: &ReplyNotice) -> Result<(), ReplywiseError> {
        let response = self
            .client
            .post(&self.url)
            .json(notice)
            .send()
            .await
            .map_err(|e| ReplywiseError::Transport {
                message: format!("notification delivery failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReplywiseError::Transport {
                message: format!("notification endpoint returned {status}"),
                source: None,
            });
        }
        debug!(review_id = notice.review_id.as_str(), "notification delivered");
        Ok(())
    }
}

/// Writes notices to the log. Used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl PluginAdapter for LogNotifier {
    fn name(&self) -> &str {
        "log-notifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplywiseError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReplywiseError> {
        Ok(())
    }
}

#[async_trait]
impl ReplyNotifier for LogNotifier {
    async fn notify(&self, notice: &ReplyNotice) -> Result<(), ReplywiseError> {
        info!(
            user_id = notice.user_id.as_str(),
            business_id = notice.business_id.as_str(),
            review_id = notice.review_id.as_str(),
            rating = notice.rating.value(),
            status = %notice.status,
            "reply ready"
        );
        Ok(())
    }
}
