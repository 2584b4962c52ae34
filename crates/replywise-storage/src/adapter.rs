// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`ReviewStore`] and [`UsageLedger`].

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use replywise_config::model::StorageConfig;
use replywise_core::types::{
    Business, InsertOutcome, PlatformAccount, ReplyRecord, ReplyStatus, Review, StarRating,
};
use replywise_core::{
    AdapterType, HealthStatus, PluginAdapter, ReplywiseError, ReviewStore, UsageLedger,
};

use crate::database::Database;
use crate::queries::{businesses, replies, reviews, usage};

/// SQLite-backed review repository.
///
/// The connection is opened by [`ReviewStore::initialize`]; every other
/// call fails with a storage error until then.
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, ReplywiseError> {
        self.db.get().ok_or_else(|| ReplywiseError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplywiseError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReplywiseError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for SqliteStore {
    async fn initialize(&self) -> Result<(), ReplywiseError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ReplywiseError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite review store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ReplywiseError> {
        self.db()?.checkpoint().await
    }

    async fn upsert_business(&self, business: &Business) -> Result<(), ReplywiseError> {
        businesses::upsert_business(self.db()?, business).await
    }

    async fn get_business(&self, id: &str) -> Result<Option<Business>, ReplywiseError> {
        businesses::get_business(self.db()?, id).await
    }

    async fn upsert_account(&self, account: &PlatformAccount) -> Result<(), ReplywiseError> {
        businesses::upsert_account(self.db()?, account).await
    }

    async fn get_account(&self, id: &str) -> Result<Option<PlatformAccount>, ReplywiseError> {
        businesses::get_account(self.db()?, id).await
    }

    async fn set_plan(&self, user_id: &str, monthly_limit: i64) -> Result<(), ReplywiseError> {
        businesses::set_plan(self.db()?, user_id, monthly_limit).await
    }

    async fn insert_review_if_absent(
        &self,
        review: &Review,
    ) -> Result<InsertOutcome, ReplywiseError> {
        reviews::insert_if_absent(self.db()?, review).await
    }

    async fn get_review(&self, id: &str) -> Result<Option<Review>, ReplywiseError> {
        reviews::get_review(self.db()?, id).await
    }

    async fn get_review_by_external_id(
        &self,
        business_id: &str,
        external_review_id: &str,
    ) -> Result<Option<Review>, ReplywiseError> {
        reviews::get_by_external_id(self.db()?, business_id, external_review_id).await
    }

    async fn update_review_status(
        &self,
        id: &str,
        status: ReplyStatus,
    ) -> Result<(), ReplywiseError> {
        reviews::update_status(self.db()?, id, status).await
    }

    async fn update_review_text(
        &self,
        id: &str,
        comment: Option<&str>,
        rating: StarRating,
        updated_at: &str,
    ) -> Result<(), ReplywiseError> {
        reviews::update_text(self.db()?, id, comment, rating, updated_at).await
    }

    async fn create_draft(&self, reply: &ReplyRecord) -> Result<(), ReplywiseError> {
        replies::create_draft(self.db()?, reply).await
    }

    async fn insert_reply_with_status(
        &self,
        reply: &ReplyRecord,
        status: ReplyStatus,
    ) -> Result<(), ReplywiseError> {
        replies::insert_with_status(self.db()?, reply, status).await
    }

    async fn active_draft(&self, review_id: &str) -> Result<Option<ReplyRecord>, ReplywiseError> {
        replies::active_draft(self.db()?, review_id).await
    }

    async fn list_replies(&self, review_id: &str) -> Result<Vec<ReplyRecord>, ReplywiseError> {
        replies::list_replies(self.db()?, review_id).await
    }

    async fn mark_reply_posted(
        &self,
        reply_id: &str,
        posted_at: &str,
        posted_by: &str,
    ) -> Result<(), ReplywiseError> {
        replies::mark_posted(self.db()?, reply_id, posted_at, posted_by).await
    }

    async fn mark_reply_rejected(&self, reply_id: &str) -> Result<(), ReplywiseError> {
        replies::mark_rejected(self.db()?, reply_id).await
    }
}

#[async_trait]
impl UsageLedger for SqliteStore {
    async fn monthly_limit(&self, user_id: &str) -> Result<Option<i64>, ReplywiseError> {
        usage::monthly_limit(self.db()?, user_id).await
    }

    async fn count_quota_usage(
        &self,
        user_id: &str,
        since: &str,
    ) -> Result<u64, ReplywiseError> {
        usage::count_quota_usage(self.db()?, user_id, since).await
    }
}
