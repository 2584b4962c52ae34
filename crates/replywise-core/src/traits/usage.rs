// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of plan limits and reply usage.

use async_trait::async_trait;

use crate::error::ReplywiseError;

/// Source of quota data for the quota gate.
///
/// Kept apart from [`crate::ReviewStore`] so the gate can be exercised
/// against a counting stub.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Stored monthly limit for `user_id`. `None` when no plan is on record;
    /// `Some(-1)` means unlimited.
    async fn monthly_limit(&self, user_id: &str) -> Result<Option<i64>, ReplywiseError>;

    /// Number of quota-consuming replies across all of the user's businesses
    /// generated at or after `since` (ISO 8601).
    async fn count_quota_usage(&self, user_id: &str, since: &str)
    -> Result<u64, ReplywiseError>;
}
