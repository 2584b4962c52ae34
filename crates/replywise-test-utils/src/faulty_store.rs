// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store wrapper that fails selected writes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use replywise_core::types::{
    AdapterType, Business, HealthStatus, InsertOutcome, PlatformAccount, ReplyRecord,
    ReplyStatus, Review, StarRating,
};
use replywise_core::{PluginAdapter, ReplywiseError, ReviewStore};

#[derive(Default)]
struct Faults {
    review_inserts: HashMap<String, usize>,
    reply_writes: usize,
}

/// Forwards every call to the wrapped store unless a failure is queued
/// for it. Queued failures surface as storage errors.
#[derive(Clone)]
pub struct FaultyStore {
    inner: Arc<dyn ReviewStore>,
    faults: Arc<Mutex<Faults>>,
}

impl FaultyStore {
    pub fn new(inner: Arc<dyn ReviewStore>) -> Self {
        Self {
            inner,
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    /// Fails the next `times` inserts of the review with this external id.
    pub async fn fail_review_insert(&self, external_review_id: &str, times: usize) {
        self.faults
            .lock()
            .await
            .review_inserts
            .insert(external_review_id.to_string(), times);
    }

    /// Fails the next `times` reply-with-status writes.
    pub async fn fail_reply_writes(&self, times: usize) {
        self.faults.lock().await.reply_writes = times;
    }

    async fn take_review_insert(&self, external_review_id: &str) -> bool {
        let mut faults = self.faults.lock().await;
        match faults.review_inserts.get_mut(external_review_id) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        }
    }

    async fn take_reply_write(&self) -> bool {
        let mut faults = self.faults.lock().await;
        if faults.reply_writes > 0 {
            faults.reply_writes -= 1;
            true
        } else {
            false
        }
    }
}

fn injected(what: &str) -> ReplywiseError {
    ReplywiseError::Storage {
        source: format!("injected failure: {what}").into(),
    }
}

#[async_trait]
impl PluginAdapter for FaultyStore {
    fn name(&self) -> &str {
        "faulty-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplywiseError> {
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), ReplywiseError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl ReviewStore for FaultyStore {
    async fn initialize(&self) -> Result<(), ReplywiseError> {
        self.inner.initialize().await
    }

    async fn close(&self) -> Result<(), ReplywiseError> {
        self.inner.close().await
    }

    async fn upsert_business(&self, business: &Business) -> Result<(), ReplywiseError> {
        self.inner.upsert_business(business).await
    }

    async fn get_business(&self, id: &str) -> Result<Option<Business>, ReplywiseError> {
        self.inner.get_business(id).await
    }

    async fn upsert_account(&self, account: &PlatformAccount) -> Result<(), ReplywiseError> {
        self.inner.upsert_account(account).await
    }

    async fn get_account(&self, id: &str) -> Result<Option<PlatformAccount>, ReplywiseError> {
        self.inner.get_account(id).await
    }

    async fn set_plan(&self, user_id: &str, monthly_limit: i64) -> Result<(), ReplywiseError> {
        self.inner.set_plan(user_id, monthly_limit).await
    }

    async fn insert_review_if_absent(
        &self,
        review: &Review,
    ) -> Result<InsertOutcome, ReplywiseError> {
        if self.take_review_insert(&review.external_review_id).await {
            return Err(injected("review insert"));
        }
        self.inner.insert_review_if_absent(review).await
    }

    async fn get_review(&self, id: &str) -> Result<Option<Review>, ReplywiseError> {
        self.inner.get_review(id).await
    }

    async fn get_review_by_external_id(
        &self,
        business_id: &str,
        external_review_id: &str,
    ) -> Result<Option<Review>, ReplywiseError> {
        self.inner
            .get_review_by_external_id(business_id, external_review_id)
            .await
    }

    async fn update_review_status(
        &self,
        id: &str,
        status: ReplyStatus,
    ) -> Result<(), ReplywiseError> {
        self.inner.update_review_status(id, status).await
    }

    async fn update_review_text(
        &self,
        id: &str,
        comment: Option<&str>,
        rating: StarRating,
        updated_at: &str,
    ) -> Result<(), ReplywiseError> {
        self.inner
            .update_review_text(id, comment, rating, updated_at)
            .await
    }

    async fn create_draft(&self, reply: &ReplyRecord) -> Result<(), ReplywiseError> {
        self.inner.create_draft(reply).await
    }

    async fn insert_reply_with_status(
        &self,
        reply: &ReplyRecord,
        status: ReplyStatus,
    ) -> Result<(), ReplywiseError> {
        if self.take_reply_write().await {
            return Err(injected("reply write"));
        }
        self.inner.insert_reply_with_status(reply, status).await
    }

    async fn active_draft(&self, review_id: &str) -> Result<Option<ReplyRecord>, ReplywiseError> {
        self.inner.active_draft(review_id).await
    }

    async fn list_replies(&self, review_id: &str) -> Result<Vec<ReplyRecord>, ReplywiseError> {
        self.inner.list_replies(review_id).await
    }

    async fn mark_reply_posted(
        &self,
        reply_id: &str,
        posted_at: &str,
        posted_by: &str,
    ) -> Result<(), ReplywiseError> {
        self.inner
            .mark_reply_posted(reply_id, posted_at, posted_by)
            .await
    }

    async fn mark_reply_rejected(&self, reply_id: &str) -> Result<(), ReplywiseError> {
        self.inner.mark_reply_rejected(reply_id).await
    }
}
