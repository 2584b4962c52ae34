// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembles the reply pipeline from configuration.

use std::sync::Arc;
use std::time::Duration;

use replywise_anthropic::AnthropicGenerator;
use replywise_config::ReplywiseConfig;
use replywise_core::{ReplyNotifier, ReplywiseError, ReviewStore};
use replywise_pipeline::{LogNotifier, PipelineSettings, ReplyPipeline, WebhookNotifier};
use replywise_platform::{PlatformClient, PublishClient};
use replywise_prompt::PromptBuilder;
use replywise_quota::QuotaGuard;
use replywise_storage::SqliteStore;
use replywise_vault::TokenCipher;
use tracing::{info, warn};

/// The pipeline and the store it owns.
pub struct Assembled {
    pub pipeline: Arc<ReplyPipeline>,
    pub store: Arc<SqliteStore>,
}

/// Opens storage and builds every adapter the pipeline needs.
pub async fn assemble(config: &ReplywiseConfig) -> Result<Assembled, ReplywiseError> {
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let quota = QuotaGuard::from_config(store.clone(), &config.quota)?;
    let generator = Arc::new(AnthropicGenerator::new(&config.anthropic)?);
    let platform = Arc::new(PlatformClient::new(&config.platform)?);

    let cipher = match config.vault.token_key.as_deref() {
        Some(key) => Some(TokenCipher::from_hex(key)?),
        None => {
            warn!("vault.token_key is not set; replies cannot be published");
            None
        }
    };
    let publisher = PublishClient::new(
        platform,
        cipher,
        Duration::from_secs(config.pipeline.publish_timeout_secs),
    );

    let notifier: Arc<dyn ReplyNotifier> = match config.pipeline.notify_webhook_url.as_deref() {
        Some(url) => Arc::new(WebhookNotifier::new(
            url,
            Duration::from_secs(config.pipeline.publish_timeout_secs),
        )?),
        None => Arc::new(LogNotifier),
    };

    let pipeline = ReplyPipeline::new(
        store.clone(),
        quota,
        PromptBuilder::default(),
        generator,
        publisher,
        PipelineSettings::from(&config.pipeline),
    )
    .with_notifier(notifier);

    info!(
        database = config.storage.database_path.as_str(),
        "reply pipeline assembled"
    );
    Ok(Assembled {
        pipeline: Arc::new(pipeline),
        store,
    })
}
