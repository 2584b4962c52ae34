// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic-backed [`ReplyGenerator`] for the Replywise pipeline.
//!
//! Each call sends exactly one Messages API request with the rendered prompt
//! as the user turn. Temperature and token limits come from configuration,
//! never from the business.

pub mod client;
pub mod types;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use replywise_config::model::AnthropicConfig;
use replywise_core::error::ReplywiseError;
use replywise_core::traits::{PluginAdapter, ReplyGenerator};
use replywise_core::types::{AdapterType, HealthStatus};
use tracing::{debug, info, warn};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// System prompt sent with every generation request.
const SYSTEM_PROMPT: &str = "You write short, genuine replies to customer reviews on behalf \
of the business that received them. Never invent facts about the business.";

/// Reply generator backed by the Anthropic Messages API.
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicGenerator {
    client: AnthropicClient,
    max_tokens: u32,
    temperature: f64,
}

impl AnthropicGenerator {
    pub fn new(config: &AnthropicConfig) -> Result<Self, ReplywiseError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = AnthropicClient::new(
            &api_key,
            &config.api_version,
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;

        info!(model = config.model.as_str(), "Anthropic generator initialized");
        Ok(Self::with_client(client, config))
    }

    /// Builds a generator around an existing client (tests point it at wiremock).
    pub fn with_client(client: AnthropicClient, config: &AnthropicConfig) -> Self {
        Self {
            client,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    fn to_message_request(&self, prompt: &str) -> MessageRequest {
        MessageRequest {
            model: self.client.default_model().to_string(),
            messages: vec![ApiMessage::user(prompt)],
            system: Some(SYSTEM_PROMPT.to_string()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicGenerator {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplywiseError> {
        // No probe request: health checks must not spend tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReplywiseError> {
        debug!("Anthropic generator shutting down");
        Ok(())
    }
}

#[async_trait]
impl ReplyGenerator for AnthropicGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ReplywiseError> {
        let started = Instant::now();
        let response = self
            .client
            .complete_message(&self.to_message_request(prompt))
            .await?;

        let text = response.text();
        if response.stop_reason.as_deref() == Some("max_tokens") {
            warn!(
                max_tokens = self.max_tokens,
                "reply generation hit the token limit"
            );
        }
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reply generated"
        );

        if text.is_empty() {
            return Err(ReplywiseError::Generation {
                message: "model returned no text".to_string(),
                source: None,
            });
        }
        Ok(text)
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: Option<&str>) -> Result<String, ReplywiseError> {
    match config_key.filter(|key| !key.is_empty()) {
        Some(key) => Ok(key.to_string()),
        None => std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            ReplywiseError::Config(
                "Anthropic API key not found. Set anthropic.api_key in config or the ANTHROPIC_API_KEY environment variable.".into(),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> AnthropicConfig {
        AnthropicConfig {
            api_key: Some("test-key".into()),
            max_tokens: 300,
            temperature: 0.2,
            ..AnthropicConfig::default()
        }
    }

    async fn generator_for(server: &MockServer) -> AnthropicGenerator {
        let config = config();
        let client = AnthropicClient::new(
            "test-key",
            &config.api_version,
            config.model.clone(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(server.uri());
        AnthropicGenerator::with_client(client, &config)
    }

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 40, "output_tokens": 12}
        }))
    }

    #[test]
    fn resolve_api_key_prefers_config() {
        assert_eq!(resolve_api_key(Some("sk-config")).unwrap(), "sk-config");
    }

    #[test]
    fn plugin_adapter_metadata() {
        let client = AnthropicClient::new(
            "k",
            "2023-06-01",
            "claude-sonnet-4-20250514".into(),
            Duration::from_secs(1),
        )
        .unwrap();
        let generator = AnthropicGenerator::with_client(client, &config());
        assert_eq!(generator.name(), "anthropic");
        assert_eq!(generator.adapter_type(), AdapterType::Generator);
    }

    #[tokio::test]
    async fn generate_sends_prompt_with_fixed_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "max_tokens": 300,
                "temperature": 0.2,
                "messages": [{"role": "user", "content": "PROMPT"}]
            })))
            .respond_with(reply(" Thank you for visiting! "))
            .expect(1)
            .mount(&server)
            .await;

        let text = generator_for(&server).await.generate("PROMPT").await.unwrap();
        assert_eq!(text, "Thank you for visiting!");
    }

    #[tokio::test]
    async fn empty_output_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("   "))
            .mount(&server)
            .await;

        let err = generator_for(&server).await.generate("PROMPT").await.unwrap_err();
        assert!(matches!(err, ReplywiseError::Generation { .. }));
    }

    #[tokio::test]
    async fn backend_failure_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let err = generator_for(&server).await.generate("PROMPT").await.unwrap_err();
        assert!(matches!(err, ReplywiseError::Generation { .. }));
        assert!(err.to_string().contains("500"));
    }
}
