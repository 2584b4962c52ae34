// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use replywise_core::types::{AdapterType, HealthStatus, ReplyNotice};
use replywise_core::{PluginAdapter, ReplyNotifier, ReplywiseError};

/// Keeps every notice it receives.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<ReplyNotice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn notices(&self) -> Vec<ReplyNotice> {
        self.notices.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for RecordingNotifier {
    fn name(&self) -> &str {
        "recording-notifier"
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
impl ReplyNotifier for RecordingNotifier {
    async fn notify(&self, notice: &ReplyNotice) -> Result<(), ReplywiseError> {
        self.notices.lock().await.push(notice.clone());
        Ok(())
    }
}
