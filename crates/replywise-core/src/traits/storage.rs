// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for reviews, replies, businesses and accounts.

use async_trait::async_trait;

use crate::error::ReplywiseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Business, InsertOutcome, PlatformAccount, ReplyRecord, ReplyStatus, Review, StarRating,
};

/// Persistence backend for the reply pipeline.
///
/// Each method is atomic on its own. The compound operations,
/// [`ReviewStore::insert_review_if_absent`], [`ReviewStore::create_draft`]
/// and [`ReviewStore::insert_reply_with_status`], must be safe under
/// concurrent callers.
#[async_trait]
pub trait ReviewStore: PluginAdapter {
    /// Initializes the backend (migrations, pragmas).
    async fn initialize(&self) -> Result<(), ReplywiseError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), ReplywiseError>;

    // --- Businesses, accounts and plans ---

    async fn upsert_business(&self, business: &Business) -> Result<(), ReplywiseError>;

    async fn get_business(&self, id: &str) -> Result<Option<Business>, ReplywiseError>;

    async fn upsert_account(&self, account: &PlatformAccount) -> Result<(), ReplywiseError>;

    async fn get_account(&self, id: &str) -> Result<Option<PlatformAccount>, ReplywiseError>;

    /// Stores a user's monthly reply limit (`-1` for unlimited).
    async fn set_plan(&self, user_id: &str, monthly_limit: i64) -> Result<(), ReplywiseError>;

    // --- Reviews ---

    /// Inserts `review` unless one with the same business and external id
    /// exists. Exactly one of any number of concurrent callers observes
    /// [`InsertOutcome::Inserted`].
    async fn insert_review_if_absent(
        &self,
        review: &Review,
    ) -> Result<InsertOutcome, ReplywiseError>;

    async fn get_review(&self, id: &str) -> Result<Option<Review>, ReplywiseError>;

    async fn get_review_by_external_id(
        &self,
        business_id: &str,
        external_review_id: &str,
    ) -> Result<Option<Review>, ReplywiseError>;

    async fn update_review_status(
        &self,
        id: &str,
        status: ReplyStatus,
    ) -> Result<(), ReplywiseError>;

    /// Applies an edit made by the reviewer on the platform.
    async fn update_review_text(
        &self,
        id: &str,
        comment: Option<&str>,
        rating: StarRating,
        updated_at: &str,
    ) -> Result<(), ReplywiseError>;

    // --- Replies ---

    /// Stores `reply` as the review's only active draft, marking any
    /// previous draft rejected in the same transaction.
    async fn create_draft(&self, reply: &ReplyRecord) -> Result<(), ReplywiseError>;

    /// Inserts a reply record as-is (imported or already posted replies)
    /// and sets the review's status, in one transaction.
    async fn insert_reply_with_status(
        &self,
        reply: &ReplyRecord,
        status: ReplyStatus,
    ) -> Result<(), ReplywiseError>;

    /// The review's current draft, if any.
    async fn active_draft(&self, review_id: &str) -> Result<Option<ReplyRecord>, ReplywiseError>;

    /// All reply records of a review, oldest first.
    async fn list_replies(&self, review_id: &str) -> Result<Vec<ReplyRecord>, ReplywiseError>;

    async fn mark_reply_posted(
        &self,
        reply_id: &str,
        posted_at: &str,
        posted_by: &str,
    ) -> Result<(), ReplywiseError>;

    async fn mark_reply_rejected(&self, reply_id: &str) -> Result<(), ReplywiseError>;
}
