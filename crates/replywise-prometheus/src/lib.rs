// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics for the reply pipeline.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. The gateway
//! serves [`PrometheusAdapter::render`] on `GET /metrics`.

pub mod recording;

use async_trait::async_trait;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use replywise_core::traits::adapter::PluginAdapter;
use replywise_core::types::{AdapterType, HealthStatus};
use replywise_core::ReplywiseError;

pub use recording::{
    record_generation_latency, record_import_page, record_ingestion, record_publish,
    record_reply, register_metrics, set_memory_heap, set_memory_resident,
};

/// Owns the installed Prometheus recorder.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
}

impl PrometheusAdapter {
    /// Installs the Prometheus recorder globally and registers metric
    /// descriptions. Fails if a recorder is already installed.
    pub fn new() -> Result<Self, ReplywiseError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            ReplywiseError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();
        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Renders all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[async_trait]
impl PluginAdapter for PrometheusAdapter {
    fn name(&self) -> &str {
        "prometheus"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Observability
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplywiseError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReplywiseError> {
        Ok(())
    }
}
