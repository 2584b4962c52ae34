// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-generation backend trait.

use async_trait::async_trait;

use crate::error::ReplywiseError;
use crate::traits::adapter::PluginAdapter;

/// Produces reply text from a fully rendered prompt.
///
/// Implementations must return [`ReplywiseError::Generation`] on backend
/// failure or when the backend yields no usable text. Callers impose their
/// own timeout.
#[async_trait]
pub trait ReplyGenerator: PluginAdapter {
    /// Generates a reply for `prompt`. The returned text is trimmed and non-empty.
    async fn generate(&self, prompt: &str) -> Result<String, ReplywiseError>;
}
