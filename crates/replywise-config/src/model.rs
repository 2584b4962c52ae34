// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Replywise service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Replywise configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplywiseConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Text-generation backend settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Review platform API settings.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Refresh-token encryption settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Monthly reply allowance settings.
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Reply pipeline timeouts and notifications.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Historical import settings.
    #[serde(default)]
    pub import: ImportConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Prometheus metrics settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Name used in logs and health output.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "replywise".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("replywise").join("replywise.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "replywise.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Anthropic API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// API key. `None` falls back to the `ANTHROPIC_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for reply generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Value of the `anthropic-version` header.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature in [0, 1].
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_anthropic_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_anthropic_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.7
}

fn default_anthropic_timeout_secs() -> u64 {
    60
}

/// Review platform configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    /// Base URL of the reviews API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// OAuth token endpoint used for refresh-token exchange.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    /// Reviews requested per listing page (platform maximum is 50).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_platform_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token_url: default_token_url(),
            client_id: None,
            client_secret: None,
            page_size: default_page_size(),
            timeout_secs: default_platform_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://mybusiness.googleapis.com".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_platform_timeout_secs() -> u64 {
    30
}

/// Refresh-token encryption configuration.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// 256-bit AES key as 64 hex characters. Required to publish replies.
    #[serde(default)]
    pub token_key: Option<String>,
}

/// Quota configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    /// Monthly limit for users without a stored plan. `-1` means unlimited.
    #[serde(default = "default_monthly_limit")]
    pub default_monthly_limit: i64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            default_monthly_limit: default_monthly_limit(),
        }
    }
}

fn default_monthly_limit() -> i64 {
    50
}

/// Reply pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Upper bound on a single generation call.
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Upper bound on token refresh plus reply post.
    #[serde(default = "default_publish_timeout_secs")]
    pub publish_timeout_secs: u64,

    /// Optional webhook that receives reply notifications as JSON.
    #[serde(default)]
    pub notify_webhook_url: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generation_timeout_secs: default_generation_timeout_secs(),
            publish_timeout_secs: default_publish_timeout_secs(),
            notify_webhook_url: None,
        }
    }
}

fn default_generation_timeout_secs() -> u64 {
    60
}

fn default_publish_timeout_secs() -> u64 {
    30
}

/// Historical import configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// Items of one page ingested concurrently.
    #[serde(default = "default_page_concurrency")]
    pub page_concurrency: usize,

    /// Pipeline runs in flight at once across the whole job.
    #[serde(default = "default_max_in_flight_generations")]
    pub max_in_flight_generations: usize,

    /// Generate drafts for imported reviews that have no reply yet.
    /// When false such reviews are marked `skipped`.
    #[serde(default = "default_generate_missing_replies")]
    pub generate_missing_replies: bool,

    /// Imported reviews bypass the quota gate and are never counted.
    #[serde(default = "default_history_quota_exempt")]
    pub history_quota_exempt: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            page_concurrency: default_page_concurrency(),
            max_in_flight_generations: default_max_in_flight_generations(),
            generate_missing_replies: default_generate_missing_replies(),
            history_quota_exempt: default_history_quota_exempt(),
        }
    }
}

fn default_page_concurrency() -> usize {
    8
}

fn default_max_in_flight_generations() -> usize {
    4
}

fn default_generate_missing_replies() -> bool {
    true
}

fn default_history_quota_exempt() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token required on all `/v1` routes. `None` rejects every request.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

/// Prometheus metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusConfig {
    #[serde(default = "default_prometheus_enabled")]
    pub enabled: bool,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enabled: default_prometheus_enabled(),
        }
    }
}

fn default_prometheus_enabled() -> bool {
    true
}

fn redact(secret: &Option<String>) -> &'static str {
    if secret.is_some() {
        "[redacted]"
    } else {
        "None"
    }
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("api_version", &self.api_version)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api_base_url", &self.api_base_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("token_key", &redact(&self.token_key))
            .finish()
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bearer_token", &redact(&self.bearer_token))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = ReplywiseConfig::default();
        config.anthropic.api_key = Some("sk-ant-secret".into());
        config.platform.client_secret = Some("client-secret".into());
        config.vault.token_key = Some("ab".repeat(32));
        config.gateway.bearer_token = Some("bearer-secret".into());

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-ant-secret"));
        assert!(!rendered.contains("client-secret"));
        assert!(!rendered.contains(&"ab".repeat(32)));
        assert!(!rendered.contains("bearer-secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
