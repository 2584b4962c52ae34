// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The review reply pipeline.
//!
//! Reviews arrive through [`IngestionDeduplicator`] (webhook) or
//! [`ImportBatcher`] (history), then [`ReplyPipeline`] runs the quota gate,
//! prompt rendering, generation, the auto-post decision and publishing.
//! Every status change is checked by [`ReplyStateMachine`].

pub mod decision;
pub mod import;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod shutdown;
pub mod state;

pub use decision::should_auto_post;
pub use import::{ImportBatcher, ImportReport, ImportSettings};
pub use ingest::{
    IngestOrigin, IngestOutcome, IngestionDeduplicator, NotificationAttributes,
    ReviewNotification,
};
pub use notify::{LogNotifier, WebhookNotifier};
pub use pipeline::{PipelineSettings, ReplyPipeline};
pub use state::{ReplyEvent, ReplyStateMachine};
