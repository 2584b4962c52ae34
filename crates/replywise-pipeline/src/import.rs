// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Historical review import.
//!
//! Pages are fetched one at a time. Items of a page are ingested
//! concurrently and the page must settle before the next fetch. Reviews
//! that need a reply are handed to a per-job worker pool that keeps running
//! across pages and is joined when the job ends.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use replywise_config::model::ImportConfig;
use replywise_core::types::{
    Business, DraftStatus, ExistingReply, PlatformReview, ProcessOutcome, ProcessRequest,
    ReplyOrigin, ReplyRecord, ReplyStatus, Review,
};
use replywise_core::ReplywiseError;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ingest::{IngestOrigin, IngestionDeduplicator};
use crate::pipeline::ReplyPipeline;
use crate::state::{ReplyEvent, ReplyStateMachine};

/// Poster identity recorded on replies found on the platform at import.
pub const POSTED_BY_PLATFORM: &str = "platform";

#[derive(Debug, Clone, Copy)]
pub struct ImportSettings {
    pub page_concurrency: usize,
    pub max_in_flight_generations: usize,
    pub generate_missing_replies: bool,
    pub history_quota_exempt: bool,
}

impl From<&ImportConfig> for ImportSettings {
    fn from(config: &ImportConfig) -> Self {
        Self {
            page_concurrency: config.page_concurrency.max(1),
            max_in_flight_generations: config.max_in_flight_generations.max(1),
            generate_missing_replies: config.generate_missing_replies,
            history_quota_exempt: config.history_quota_exempt,
        }
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

/// Counts for one import job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Listing pages fetched.
    pub pages: usize,
    /// Reviews newly stored by this job.
    pub imported: usize,
    /// Reviews that were already stored with an outcome.
    pub duplicates: usize,
    /// Reviews stored by an earlier job that never reached an outcome and
    /// were picked up again.
    pub resumed: usize,
    /// Items whose ingestion failed. Siblings are unaffected.
    pub failed_items: usize,
    /// Platform-side replies stored as `imported`/`posted`.
    pub replies_imported: usize,
    /// Pipeline runs handed to the worker pool.
    pub dispatched: usize,
    /// Final status of each dispatched run.
    pub generation: HashMap<ReplyStatus, usize>,
    /// Dispatched runs that returned an error or panicked.
    pub generation_errors: usize,
}

/// What happened to one listed review.
enum ItemOutcome {
    Duplicate,
    ReplyImported,
    Skipped,
    NeedsReply(String),
}

struct Settled {
    resumed: bool,
    outcome: ItemOutcome,
}

pub struct ImportBatcher {
    pipeline: Arc<ReplyPipeline>,
    dedup: IngestionDeduplicator,
    settings: ImportSettings,
}

impl ImportBatcher {
    pub fn new(pipeline: Arc<ReplyPipeline>, settings: ImportSettings) -> Self {
        let dedup = IngestionDeduplicator::new(pipeline.store().clone());
        Self {
            pipeline,
            dedup,
            settings,
        }
    }

    /// Imports every review the platform lists for `business_id`.
    ///
    /// A listing failure stops further fetches. Runs already dispatched are
    /// still joined before the error is returned.
    pub async fn import_history(&self, business_id: &str) -> Result<ImportReport, ReplywiseError> {
        let store = self.pipeline.store();
        let business = store
            .get_business(business_id)
            .await?
            .ok_or_else(|| ReplywiseError::not_found("business", business_id))?;
        let account = store
            .get_account(&business.account_id)
            .await?
            .ok_or_else(|| ReplywiseError::not_found("platform account", &business.account_id))?;

        let publisher = self.pipeline.publisher();
        let token = publisher.access_token(&account).await?;
        let platform = publisher.platform().clone();

        let workers = Arc::new(Semaphore::new(self.settings.max_in_flight_generations));
        let mut handles: Vec<JoinHandle<Result<ProcessOutcome, ReplywiseError>>> = Vec::new();
        let mut report = ImportReport::default();
        let mut page_token: Option<String> = None;

        info!(business_id, "historical import started");
        let listing_error = loop {
            let page = match platform
                .list_reviews(&token, &business.location_name, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => break Some(e),
            };
            report.pages += 1;
            #[cfg(feature = "prometheus")]
            replywise_prometheus::record_import_page();

            let outcomes: Vec<Result<Settled, ReplywiseError>> =
                futures::stream::iter(page.reviews)
                    .map(|item| self.import_one(&business, item))
                    .buffer_unordered(self.settings.page_concurrency)
                    .collect()
                    .await;

            for settled in outcomes {
                let settled = match settled {
                    Ok(settled) => settled,
                    Err(e) => {
                        report.failed_items += 1;
                        warn!(business_id, error = %e, "review import failed");
                        continue;
                    }
                };
                match (&settled.outcome, settled.resumed) {
                    (ItemOutcome::Duplicate, _) => report.duplicates += 1,
                    (_, true) => report.resumed += 1,
                    (_, false) => report.imported += 1,
                }
                match settled.outcome {
                    ItemOutcome::Duplicate | ItemOutcome::Skipped => {}
                    ItemOutcome::ReplyImported => report.replies_imported += 1,
                    ItemOutcome::NeedsReply(review_id) => {
                        report.dispatched += 1;
                        handles.push(self.dispatch(&business, review_id, workers.clone()));
                    }
                }
            }
            debug!(
                business_id,
                page = report.pages,
                imported = report.imported,
                "import page settled"
            );

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break None,
            }
        };

        for joined in futures::future::join_all(handles).await {
            match joined {
                Ok(Ok(outcome)) => {
                    *report.generation.entry(outcome.reply_status).or_default() += 1;
                }
                Ok(Err(e)) => {
                    report.generation_errors += 1;
                    warn!(business_id, error = %e, "imported review processing failed");
                }
                Err(e) => {
                    report.generation_errors += 1;
                    warn!(business_id, error = %e, "imported review task aborted");
                }
            }
        }

        if let Some(e) = listing_error {
            warn!(business_id, pages = report.pages, error = %e, "historical import aborted");
            return Err(e);
        }

        info!(
            business_id,
            pages = report.pages,
            imported = report.imported,
            duplicates = report.duplicates,
            resumed = report.resumed,
            failed_items = report.failed_items,
            replies_imported = report.replies_imported,
            dispatched = report.dispatched,
            generation_errors = report.generation_errors,
            "historical import finished"
        );
        Ok(report)
    }

    /// Stores one listed review and decides what it needs next.
    ///
    /// A review that is already stored but never reached an outcome (an
    /// earlier job failed on it after the insert) takes the same path as a
    /// new one.
    async fn import_one(
        &self,
        business: &Business,
        item: PlatformReview,
    ) -> Result<Settled, ReplywiseError> {
        let payload = item.payload;
        let outcome = self
            .dedup
            .ingest(
                &business.id,
                &payload,
                IngestOrigin::Import,
                self.settings.history_quota_exempt,
            )
            .await?;
        let review = outcome.review;
        let resumed = !outcome.created;
        if resumed {
            if self.pipeline.current_state(&review).await?.is_some() {
                return Ok(Settled {
                    resumed,
                    outcome: ItemOutcome::Duplicate,
                });
            }
            debug!(
                review_id = review.id.as_str(),
                "resuming stored review without an outcome"
            );
        }

        let outcome = self.settle(review, payload.existing_reply).await?;
        Ok(Settled { resumed, outcome })
    }

    async fn settle(
        &self,
        review: Review,
        existing_reply: Option<ExistingReply>,
    ) -> Result<ItemOutcome, ReplywiseError> {
        let store = self.pipeline.store();

        if let Some(existing) = existing_reply {
            let reply = ReplyRecord {
                id: uuid::Uuid::new_v4().to_string(),
                review_id: review.id.clone(),
                text: existing.text,
                status: DraftStatus::Posted,
                origin: ReplyOrigin::Imported,
                quota_consuming: false,
                generated_at: existing.updated_at.clone(),
                posted_at: Some(existing.updated_at),
                posted_by: Some(POSTED_BY_PLATFORM.to_string()),
            };
            let next = ReplyStateMachine::next(None, ReplyEvent::ImportedReply)?;
            store.insert_reply_with_status(&reply, next).await?;
            return Ok(ItemOutcome::ReplyImported);
        }

        if !self.settings.generate_missing_replies {
            let next = ReplyStateMachine::next(None, ReplyEvent::Skip)?;
            store.update_review_status(&review.id, next).await?;
            return Ok(ItemOutcome::Skipped);
        }

        Ok(ItemOutcome::NeedsReply(review.id))
    }

    fn dispatch(
        &self,
        business: &Business,
        review_id: String,
        workers: Arc<Semaphore>,
    ) -> JoinHandle<Result<ProcessOutcome, ReplywiseError>> {
        let pipeline = self.pipeline.clone();
        let request = ProcessRequest {
            user_id: business.user_id.clone(),
            account_id: business.account_id.clone(),
            business_id: business.id.clone(),
            review_id,
        };
        tokio::spawn(async move {
            let _permit = workers
                .acquire_owned()
                .await
                .map_err(|e| ReplywiseError::Internal(format!("import worker pool closed: {e}")))?;
            pipeline.process(&request).await
        })
    }
}
