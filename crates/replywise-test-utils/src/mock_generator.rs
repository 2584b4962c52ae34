// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic reply generator.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use replywise_core::types::{AdapterType, HealthStatus};
use replywise_core::{PluginAdapter, ReplyGenerator, ReplywiseError};

pub const DEFAULT_MOCK_REPLY: &str = "Thank you for your review!";

/// One scripted generator response.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Failure(String),
    /// Sleeps before answering; pair with a short generation timeout.
    Delayed(Duration, String),
}

/// Pops scripted replies in FIFO order and records every prompt.
///
/// With an empty queue it answers [`DEFAULT_MOCK_REPLY`], or the prompt
/// itself in echo mode.
#[derive(Clone, Default)]
pub struct MockGenerator {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    echo: bool,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().map(MockReply::Text).collect())),
            ..Self::default()
        }
    }

    /// Returns each prompt as the generated text.
    pub fn echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub async fn push(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    pub async fn push_failure(&self, message: &str) {
        self.push(MockReply::Failure(message.to_string())).await;
    }

    /// Prompts received so far, oldest first.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplywiseError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReplywiseError> {
        Ok(())
    }
}

#[async_trait]
impl ReplyGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ReplywiseError> {
        self.prompts.lock().await.push(prompt.to_string());
        let next = self.replies.lock().await.pop_front();
        match next {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Failure(message)) => Err(ReplywiseError::Generation {
                message,
                source: None,
            }),
            Some(MockReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None if self.echo => Ok(prompt.to_string()),
            None => Ok(DEFAULT_MOCK_REPLY.to_string()),
        }
    }
}
