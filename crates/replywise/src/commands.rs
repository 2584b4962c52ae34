// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `import`, `process` and `config`.

use replywise_config::ReplywiseConfig;
use replywise_core::{ReplywiseError, ReviewStore};
use replywise_pipeline::{ImportBatcher, ImportSettings};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::wiring;

/// Runs `replywise import <business-id>` and prints the report as JSON.
///
/// A signal abandons the job; work already stored stays stored and a
/// rerun skips it as duplicates.
pub async fn run_import(config: ReplywiseConfig, business_id: &str) -> Result<(), ReplywiseError> {
    let assembled = wiring::assemble(&config).await?;
    let importer = ImportBatcher::new(
        assembled.pipeline.clone(),
        ImportSettings::from(&config.import),
    );

    let cancel = CancellationToken::new();
    replywise_pipeline::shutdown::install_signal_handler(cancel.clone());

    let result = tokio::select! {
        result = importer.import_history(business_id) => result,
        _ = cancel.cancelled() => {
            warn!(business_id, "import interrupted");
            Err(ReplywiseError::Internal("import interrupted by signal".to_string()))
        }
    };
    cancel.cancel();
    assembled.store.close().await?;

    let report = result?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| ReplywiseError::Internal(format!("failed to render report: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Runs `replywise process <review-id>` and prints the final status.
pub async fn run_process(config: ReplywiseConfig, review_id: &str) -> Result<(), ReplywiseError> {
    let assembled = wiring::assemble(&config).await?;
    let result = assembled.pipeline.process_review(review_id).await;
    assembled.store.close().await?;

    let outcome = result?;
    info!(review_id, status = %outcome.reply_status, "review processed");
    println!("{}", outcome.reply_status);
    Ok(())
}

/// Runs `replywise config`: prints the validated configuration as TOML
/// with secrets replaced.
pub fn run_config(config: &ReplywiseConfig) -> Result<(), ReplywiseError> {
    let rendered = render_redacted(config)?;
    print!("{rendered}");
    Ok(())
}

const REDACTED: &str = "[redacted]";

fn redact(value: &mut Option<String>) {
    if value.is_some() {
        *value = Some(REDACTED.to_string());
    }
}

pub fn render_redacted(config: &ReplywiseConfig) -> Result<String, ReplywiseError> {
    let mut shown = config.clone();
    redact(&mut shown.anthropic.api_key);
    redact(&mut shown.platform.client_secret);
    redact(&mut shown.vault.token_key);
    redact(&mut shown.gateway.bearer_token);
    toml::to_string_pretty(&shown)
        .map_err(|e| ReplywiseError::Config(format!("failed to render config: {e}")))
}
