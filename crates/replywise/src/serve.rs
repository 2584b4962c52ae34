// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `replywise serve` command implementation.
//!
//! Assembles the pipeline, starts the HTTP gateway and optional Prometheus
//! metrics, and runs until SIGINT/SIGTERM. Webhook-triggered pipeline runs
//! still in flight are awaited before storage is closed.

use replywise_config::ReplywiseConfig;
use replywise_core::{ReplywiseError, ReviewStore};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::wiring;

/// Runs the `replywise serve` command.
pub async fn run_serve(config: ReplywiseConfig) -> Result<(), ReplywiseError> {
    info!(service = config.service.name.as_str(), "starting replywise serve");

    let assembled = wiring::assemble(&config).await?;

    // Initialize Prometheus metrics (if enabled and compiled in).
    #[cfg(feature = "prometheus")]
    let prometheus_adapter = if config.prometheus.enabled {
        match replywise_prometheus::PrometheusAdapter::new() {
            Ok(adapter) => {
                info!("prometheus metrics enabled");
                Some(std::sync::Arc::new(adapter))
            }
            Err(e) => {
                warn!(error = %e, "prometheus initialization failed, continuing without metrics");
                None
            }
        }
    } else {
        None
    };

    let cancel = CancellationToken::new();
    replywise_pipeline::shutdown::install_signal_handler(cancel.clone());

    {
        let mem_cancel = cancel.clone();
        tokio::spawn(async move {
            memory_monitor(mem_cancel).await;
        });
    }

    #[cfg(feature = "gateway")]
    if config.gateway.enabled {
        #[cfg(feature = "prometheus")]
        let prometheus_render: Option<std::sync::Arc<dyn Fn() -> String + Send + Sync>> =
            prometheus_adapter.clone().map(|adapter| {
                std::sync::Arc::new(move || adapter.render())
                    as std::sync::Arc<dyn Fn() -> String + Send + Sync>
            });
        #[cfg(not(feature = "prometheus"))]
        let prometheus_render = None;

        if config.gateway.bearer_token.is_none() {
            warn!("gateway.bearer_token is not set; every /v1 request will be rejected");
        }

        let state = replywise_gateway::GatewayState::new(
            assembled.pipeline.clone(),
            replywise_pipeline::ImportSettings::from(&config.import),
            replywise_gateway::AuthConfig {
                bearer_token: config.gateway.bearer_token.clone(),
            },
            replywise_gateway::HealthState::new(prometheus_render),
        );
        let server_config = replywise_gateway::ServerConfig {
            host: config.gateway.host.clone(),
            port: config.gateway.port,
        };
        let result =
            replywise_gateway::start_server(&server_config, state, cancel.clone()).await;
        cancel.cancel();
        assembled.store.close().await?;
        result?;
        info!("replywise serve shutdown complete");
        return Ok(());
    }

    info!("gateway disabled; waiting for shutdown signal");
    cancel.cancelled().await;
    assembled.store.close().await?;
    info!("replywise serve shutdown complete");
    Ok(())
}

/// Background task that exports jemalloc heap statistics every 5 seconds.
#[cfg(not(target_env = "msvc"))]
async fn memory_monitor(cancel: CancellationToken) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(5));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Stats are cached until the epoch advances.
                let _ = tikv_jemalloc_ctl::epoch::advance();
                let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
                let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);

                #[cfg(feature = "prometheus")]
                {
                    replywise_prometheus::set_memory_heap(allocated as f64);
                    replywise_prometheus::set_memory_resident(resident as f64);
                }
                tracing::trace!(allocated, resident, "memory sample");
            }
            _ = cancel.cancelled() => {
                tracing::debug!("memory monitor shutting down");
                break;
            }
        }
    }
}

/// Stub memory monitor for MSVC (no jemalloc).
#[cfg(target_env = "msvc")]
async fn memory_monitor(cancel: CancellationToken) {
    cancel.cancelled().await;
}
