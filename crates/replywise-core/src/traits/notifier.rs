// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget notification channel for reply outcomes.

use async_trait::async_trait;

use crate::error::ReplywiseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ReplyNotice;

/// Tells the business owner that a reply is waiting or has been posted.
///
/// Failures are logged by the caller and never change a review's status.
#[async_trait]
pub trait ReplyNotifier: PluginAdapter {
    async fn notify(&self, notice: &ReplyNotice) -> Result<(), ReplywiseError>;
}
