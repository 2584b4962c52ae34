// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Replywise review reply pipeline.
//!
//! This crate provides the trait definitions, error types, and domain types
//! used throughout the Replywise workspace. Storage, generation, platform and
//! notification backends implement traits defined here.

pub mod error;
pub mod time;
pub mod traits;
pub mod types;

pub use error::{PublishErrorKind, ReplywiseError};
pub use types::{
    AccessToken, AdapterType, Business, BusinessConfig, DraftStatus, ExistingReply,
    HealthStatus, InsertOutcome, LanguageMode, PlatformAccount, PlatformReview, PostedReply,
    ProcessOutcome, ProcessRequest, QuotaCheck, QuotaLimit, ReplyNotice, ReplyOrigin,
    ReplyRecord, ReplyStatus, Review, ReviewPage, ReviewPayload, SealedToken, StarConfig,
    StarRating, Tone, POSTED_BY_SYSTEM,
};

pub use traits::{
    PluginAdapter, ReplyGenerator, ReplyNotifier, ReviewPlatform, ReviewStore, UsageLedger,
};
