// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply status state machine.
//!
//! A review is in the *initial* state (`None` here) from ingestion until
//! its first pipeline round records an outcome. Every status write in the
//! pipeline goes through [`ReplyStateMachine::next`].

use replywise_core::ReplywiseError;
use replywise_core::types::ReplyStatus;
use strum::Display;

/// Something that happened to a review's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReplyEvent {
    /// The quota gate refused generation.
    QuotaBlocked,
    /// A draft was generated and held for approval.
    DraftHeld,
    /// A draft was generated and auto-published.
    AutoPosted,
    /// Generation, publish, or a per-review configuration check failed.
    ProcessingFailed,
    /// Generation is disabled for this review.
    Skip,
    /// A reply already existed on the platform at import time.
    ImportedReply,
    /// Human approval.
    Approved,
    /// The active draft was published.
    Published,
    /// Human discarded the draft.
    Discarded,
    /// A human asked for a fresh AI draft.
    Regenerated,
    /// A human wrote the draft.
    ManuallyDrafted,
}

pub struct ReplyStateMachine;

impl ReplyStateMachine {
    /// Returns the status that `event` leads to from `current`, or
    /// [`ReplywiseError::InvalidTransition`].
    pub fn next(
        current: Option<ReplyStatus>,
        event: ReplyEvent,
    ) -> Result<ReplyStatus, ReplywiseError> {
        use ReplyEvent as E;
        use ReplyStatus as S;

        let next = match (current, event) {
            // First round. A quota-blocked review can be re-triggered.
            (None | Some(S::QuotaExceeded), E::QuotaBlocked) => S::QuotaExceeded,
            (None | Some(S::QuotaExceeded), E::DraftHeld) => S::Pending,
            (None | Some(S::QuotaExceeded), E::AutoPosted) => S::Posted,
            (None | Some(S::QuotaExceeded), E::ProcessingFailed) => S::Failed,
            (None, E::Skip) => S::Skipped,
            (None, E::ImportedReply) => S::Posted,

            // Human actions.
            (Some(S::Pending), E::Approved) => S::Approved,
            (Some(S::Approved | S::Failed), E::Published) => S::Posted,
            (Some(S::Pending | S::Approved | S::Failed), E::Discarded) => S::Rejected,

            // Regeneration rounds.
            (Some(S::Failed | S::Rejected | S::Skipped), E::Regenerated) => S::Pending,
            (Some(S::Failed | S::Rejected | S::Skipped), E::QuotaBlocked) => S::QuotaExceeded,
            (Some(S::Failed | S::Rejected | S::Skipped), E::ProcessingFailed) => S::Failed,

            (
                None | Some(S::Pending | S::Rejected | S::Failed | S::Skipped | S::QuotaExceeded),
                E::ManuallyDrafted,
            ) => S::Pending,

            (from, event) => {
                return Err(ReplywiseError::InvalidTransition {
                    from: from.map_or_else(|| "initial".to_string(), |s| s.to_string()),
                    event: event.to_string(),
                });
            }
        };
        Ok(next)
    }

    /// True when a pipeline round may run: the review has no outcome yet,
    /// or it was blocked by quota.
    pub fn is_processable(current: Option<ReplyStatus>) -> bool {
        matches!(current, None | Some(ReplyStatus::QuotaExceeded))
    }
}
