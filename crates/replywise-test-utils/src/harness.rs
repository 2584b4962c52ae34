// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline tests.
//!
//! `TestHarness` assembles a complete reply pipeline around a temp SQLite
//! database, a mock generator, a mock platform and a recording notifier.
//! One business (`biz-1`, owned by `user-1`, connected through `acct-1`)
//! is seeded with a sealed refresh token. The pipeline reaches the
//! database through a [`FaultyStore`] so tests can fail single writes.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use replywise_config::model::StorageConfig;
use replywise_core::time::now_timestamp;
use replywise_core::types::{
    Business, BusinessConfig, DraftStatus, PlatformAccount, ProcessOutcome, ReplyOrigin,
    ReplyRecord, ReplyStatus, Review, ReviewPayload, StarRating, POSTED_BY_SYSTEM,
};
use replywise_core::{QuotaLimit, ReplywiseError, ReviewStore};
use replywise_pipeline::{
    ImportBatcher, ImportSettings, IngestOrigin, IngestOutcome, IngestionDeduplicator,
    PipelineSettings, ReplyPipeline,
};
use replywise_platform::PublishClient;
use replywise_prompt::PromptBuilder;
use replywise_quota::QuotaGuard;
use replywise_storage::SqliteStore;
use replywise_vault::TokenCipher;

use crate::faulty_store::FaultyStore;
use crate::mock_generator::MockGenerator;
use crate::mock_platform::MockPlatform;
use crate::recording_notifier::RecordingNotifier;

pub const BUSINESS_ID: &str = "biz-1";
pub const USER_ID: &str = "user-1";
pub const ACCOUNT_ID: &str = "acct-1";
pub const LOCATION_NAME: &str = "accounts/1/locations/1";
pub const REFRESH_TOKEN: &str = "refresh-token-1";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: BusinessConfig,
    auto_reply: Vec<(u8, bool)>,
    instructions: Vec<(u8, String)>,
    monthly_limit: Option<i64>,
    default_limit: QuotaLimit,
    refresh_token: bool,
    generator: MockGenerator,
    generation_timeout: Option<Duration>,
    publish_timeout: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: BusinessConfig::default(),
            auto_reply: Vec::new(),
            instructions: Vec::new(),
            monthly_limit: None,
            default_limit: QuotaLimit::Unlimited,
            refresh_token: true,
            generator: MockGenerator::new(),
            generation_timeout: None,
            publish_timeout: Duration::from_secs(5),
        }
    }

    /// Turns auto-post on or off for one star rating.
    pub fn auto_reply(mut self, rating: u8, enabled: bool) -> Self {
        self.auto_reply.push((rating, enabled));
        self
    }

    pub fn custom_instructions(mut self, rating: u8, text: &str) -> Self {
        self.instructions.push((rating, text.to_string()));
        self
    }

    pub fn contact_phone(mut self, phone: &str) -> Self {
        self.config.contact_phone = Some(phone.to_string());
        self
    }

    pub fn business_config(mut self, config: BusinessConfig) -> Self {
        self.config = config;
        self
    }

    /// Stores a plan for the test user. `-1` is unlimited.
    pub fn monthly_limit(mut self, limit: i64) -> Self {
        self.monthly_limit = Some(limit);
        self
    }

    pub fn default_limit(mut self, limit: QuotaLimit) -> Self {
        self.default_limit = limit;
        self
    }

    /// Leaves the account without a refresh token.
    pub fn without_refresh_token(mut self) -> Self {
        self.refresh_token = false;
        self
    }

    pub fn generator(mut self, generator: MockGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = Some(timeout);
        self
    }

    pub fn publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, ReplywiseError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| ReplywiseError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let store = Arc::new(SqliteStore::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        }));
        store.initialize().await?;

        let mut config = self.config;
        for (rating, enabled) in self.auto_reply {
            let rating = StarRating::try_from(rating)?;
            if let Some(star) = config.star_config_mut(rating) {
                star.auto_reply = enabled;
            }
        }
        for (rating, text) in self.instructions {
            let rating = StarRating::try_from(rating)?;
            if let Some(star) = config.star_config_mut(rating) {
                star.custom_instructions = text;
            }
        }

        let business = Business {
            id: BUSINESS_ID.to_string(),
            user_id: USER_ID.to_string(),
            account_id: ACCOUNT_ID.to_string(),
            name: "Corner Bakery".to_string(),
            location_name: LOCATION_NAME.to_string(),
            config,
        };

        let cipher = TokenCipher::generate()?;
        let sealed_refresh_token = if self.refresh_token {
            Some(cipher.seal_token(ACCOUNT_ID, &SecretString::from(REFRESH_TOKEN.to_string()))?)
        } else {
            None
        };
        let account = PlatformAccount {
            id: ACCOUNT_ID.to_string(),
            user_id: USER_ID.to_string(),
            sealed_refresh_token,
        };

        store.upsert_account(&account).await?;
        store.upsert_business(&business).await?;
        if let Some(limit) = self.monthly_limit {
            store.set_plan(USER_ID, limit).await?;
        }

        let platform = MockPlatform::new();
        let notifier = RecordingNotifier::new();
        let generator = self.generator;

        let mut settings = PipelineSettings::default();
        if let Some(timeout) = self.generation_timeout {
            settings.generation_timeout = timeout;
        }

        let faults = FaultyStore::new(store.clone());
        let pipeline = ReplyPipeline::new(
            Arc::new(faults.clone()),
            QuotaGuard::new(store.clone(), self.default_limit),
            PromptBuilder::default(),
            Arc::new(generator.clone()),
            PublishClient::new(
                Arc::new(platform.clone()),
                Some(cipher.clone()),
                self.publish_timeout,
            ),
            settings,
        )
        .with_notifier(Arc::new(notifier.clone()));

        Ok(TestHarness {
            pipeline: Arc::new(pipeline),
            store,
            faults,
            generator,
            platform,
            notifier,
            cipher,
            business,
            account,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete pipeline wired to mocks.
pub struct TestHarness {
    pub pipeline: Arc<ReplyPipeline>,
    pub store: Arc<SqliteStore>,
    /// The pipeline's view of `store`; queue write failures here.
    pub faults: FaultyStore,
    pub generator: MockGenerator,
    pub platform: MockPlatform,
    pub notifier: RecordingNotifier,
    pub cipher: TokenCipher,
    pub business: Business,
    pub account: PlatformAccount,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A webhook-style payload for the seeded business.
    pub fn payload(external_id: &str, rating: u8, comment: Option<&str>) -> ReviewPayload {
        let at = "2026-03-02T10:00:00.000Z".to_string();
        ReviewPayload {
            external_review_id: external_id.to_string(),
            reviewer_name: "Dana".to_string(),
            reviewer_photo_url: None,
            rating: StarRating::try_from(rating).unwrap_or(StarRating::ALL[4]),
            comment: comment.map(str::to_string),
            submitted_at: at.clone(),
            updated_at: at,
            is_anonymous: false,
            existing_reply: None,
        }
    }

    pub fn deduplicator(&self) -> IngestionDeduplicator {
        IngestionDeduplicator::new(self.store.clone())
    }

    /// Ingests `payload` as a webhook delivery.
    pub async fn ingest(&self, payload: &ReviewPayload) -> Result<IngestOutcome, ReplywiseError> {
        self.deduplicator()
            .ingest(BUSINESS_ID, payload, IngestOrigin::Webhook, false)
            .await
    }

    pub async fn process(&self, review_id: &str) -> Result<ProcessOutcome, ReplywiseError> {
        self.pipeline.process_review(review_id).await
    }

    /// Ingests a new review and runs the pipeline on it.
    pub async fn ingest_and_process(
        &self,
        external_id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> Result<(Review, ProcessOutcome), ReplywiseError> {
        let outcome = self
            .ingest(&Self::payload(external_id, rating, comment))
            .await?;
        let processed = self.process(&outcome.review.id).await?;
        let review = self.review(&outcome.review.id).await?;
        Ok((review, processed))
    }

    pub async fn review(&self, review_id: &str) -> Result<Review, ReplywiseError> {
        self.store
            .get_review(review_id)
            .await?
            .ok_or_else(|| ReplywiseError::not_found("review", review_id))
    }

    pub async fn status(&self, review_id: &str) -> Result<ReplyStatus, ReplywiseError> {
        Ok(self.review(review_id).await?.reply_status)
    }

    pub async fn replies(&self, review_id: &str) -> Result<Vec<ReplyRecord>, ReplywiseError> {
        self.store.list_replies(review_id).await
    }

    pub fn importer(&self, settings: ImportSettings) -> ImportBatcher {
        ImportBatcher::new(self.pipeline.clone(), settings)
    }

    /// Records `count` quota-consuming AI replies for the test user this
    /// month.
    pub async fn seed_quota_usage(&self, count: usize) -> Result<(), ReplywiseError> {
        for i in 0..count {
            let payload = Self::payload(&format!("seed-{}", uuid::Uuid::new_v4()), 5, None);
            let outcome = self.ingest(&payload).await?;
            let review_id = outcome.review.id;
            let now = now_timestamp();
            self.store
                .insert_reply_with_status(
                    &ReplyRecord {
                        id: format!("seed-reply-{i}-{review_id}"),
                        review_id: review_id.clone(),
                        text: "Thanks!".to_string(),
                        status: DraftStatus::Posted,
                        origin: ReplyOrigin::AiGenerated,
                        quota_consuming: true,
                        generated_at: now.clone(),
                        posted_at: Some(now),
                        posted_by: Some(POSTED_BY_SYSTEM.to_string()),
                    },
                    ReplyStatus::Posted,
                )
                .await?;
        }
        Ok(())
    }
}
