// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reply pipeline: quota gate, prompt, generation, auto-post decision,
//! publish, and the human actions that move a review between statuses.
//!
//! Errors local to one review end up as a status on that review. Errors
//! about the business or account (missing rows, storage failures) abort
//! the call before quota is charged.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use replywise_config::model::PipelineConfig;
use replywise_core::time::now_timestamp;
use replywise_core::types::{
    Business, DraftStatus, PlatformAccount, ProcessOutcome, ProcessRequest, ReplyNotice,
    ReplyOrigin, ReplyRecord, ReplyStatus, Review, POSTED_BY_SYSTEM,
};
use replywise_core::{ReplyGenerator, ReplyNotifier, ReplywiseError, ReviewStore};
use replywise_platform::PublishClient;
use replywise_prompt::PromptBuilder;
use replywise_quota::QuotaGuard;
use tracing::{debug, info, warn};

use crate::decision::should_auto_post;
use crate::state::{ReplyEvent, ReplyStateMachine};

/// Timeouts applied by the pipeline itself.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub generation_timeout: Duration,
}

impl From<&PipelineConfig> for PipelineSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            generation_timeout: Duration::from_secs(config.generation_timeout_secs),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

/// Which kind of generation round is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Round {
    /// First round after ingestion, or a retry after `quota_exceeded`.
    Initial,
    /// Human-requested fresh draft. Never auto-posts.
    Regenerate,
}

pub struct ReplyPipeline {
    store: Arc<dyn ReviewStore>,
    quota: QuotaGuard,
    prompts: PromptBuilder,
    generator: Arc<dyn ReplyGenerator>,
    publisher: PublishClient,
    notifier: Option<Arc<dyn ReplyNotifier>>,
    settings: PipelineSettings,
    in_flight: Mutex<HashSet<String>>,
}

/// Removes a review id from the in-flight set on drop.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    review_id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.review_id);
        }
    }
}

impl ReplyPipeline {
    pub fn new(
        store: Arc<dyn ReviewStore>,
        quota: QuotaGuard,
        prompts: PromptBuilder,
        generator: Arc<dyn ReplyGenerator>,
        publisher: PublishClient,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            quota,
            prompts,
            generator,
            publisher,
            notifier: None,
            settings,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ReplyNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn store(&self) -> &Arc<dyn ReviewStore> {
        &self.store
    }

    pub fn publisher(&self) -> &PublishClient {
        &self.publisher
    }

    /// Runs the full pipeline for one review.
    ///
    /// Safe to repeat: a review that already has an outcome (other than
    /// `quota_exceeded`) is returned unchanged, and a concurrent call for a
    /// review already being processed returns its stored status.
    pub async fn process(
        &self,
        request: &ProcessRequest,
    ) -> Result<ProcessOutcome, ReplywiseError> {
        let Some(_guard) = self.claim(&request.review_id) else {
            let review = self.load_review(&request.review_id).await?;
            debug!(review_id = review.id.as_str(), "review already in flight");
            return Ok(ProcessOutcome {
                reply_status: review.reply_status,
            });
        };

        let review = self.load_review(&request.review_id).await?;
        if review.business_id != request.business_id {
            return Err(ReplywiseError::not_found(
                "review",
                format!("{} in business {}", request.review_id, request.business_id),
            ));
        }

        let current = self.current_state(&review).await?;
        if !ReplyStateMachine::is_processable(current) {
            debug!(
                review_id = review.id.as_str(),
                status = %review.reply_status,
                "review already processed"
            );
            return Ok(ProcessOutcome {
                reply_status: review.reply_status,
            });
        }

        let business = self.load_business(&request.business_id).await?;
        let account = self.load_account(&request.account_id).await?;

        let reply_status = self
            .run_round(
                Round::Initial,
                current,
                &review,
                &business,
                Some(&account),
                &request.user_id,
            )
            .await?;
        Ok(ProcessOutcome { reply_status })
    }

    /// Resolves the owning business and account, then runs [`Self::process`].
    pub async fn process_review(
        &self,
        review_id: &str,
    ) -> Result<ProcessOutcome, ReplywiseError> {
        let review = self.load_review(review_id).await?;
        let business = self.load_business(&review.business_id).await?;
        self.process(&ProcessRequest {
            user_id: business.user_id.clone(),
            account_id: business.account_id.clone(),
            business_id: business.id.clone(),
            review_id: review.id,
        })
        .await
    }

    // --- Human actions ---

    /// `pending -> approved`.
    pub async fn approve(&self, review_id: &str) -> Result<ReplyStatus, ReplywiseError> {
        let review = self.load_review(review_id).await?;
        let current = self.current_state(&review).await?;
        let next = ReplyStateMachine::next(current, ReplyEvent::Approved)?;
        self.store.update_review_status(review_id, next).await?;
        info!(review_id, "reply approved");
        Ok(next)
    }

    /// Publishes the active draft as `actor`.
    ///
    /// On failure the status is left as it was and the error is returned,
    /// so the same draft can be retried.
    pub async fn publish(
        &self,
        review_id: &str,
        actor: &str,
    ) -> Result<ReplyStatus, ReplywiseError> {
        let review = self.load_review(review_id).await?;
        let current = self.current_state(&review).await?;
        let next = ReplyStateMachine::next(current, ReplyEvent::Published)?;

        let draft = self
            .store
            .active_draft(review_id)
            .await?
            .ok_or_else(|| ReplywiseError::not_found("draft reply", review_id))?;
        let business = self.load_business(&review.business_id).await?;
        let account = self.load_account(&business.account_id).await?;

        let publish_result = self
            .publisher
            .publish(&account, &business, &review, &draft.text)
            .await;
        record_publish(&publish_result);
        publish_result?;

        self.store
            .mark_reply_posted(&draft.id, &now_timestamp(), actor)
            .await?;
        self.store.update_review_status(review_id, next).await?;
        info!(review_id, actor, "reply published");
        self.notify(&business, &review, next, &draft.text).await;
        Ok(next)
    }

    /// `pending|approved|failed -> rejected`. The active draft, if any, is
    /// rejected with it. Quota already charged stays charged.
    pub async fn reject(&self, review_id: &str) -> Result<ReplyStatus, ReplywiseError> {
        let review = self.load_review(review_id).await?;
        let current = self.current_state(&review).await?;
        let next = ReplyStateMachine::next(current, ReplyEvent::Discarded)?;

        if let Some(draft) = self.store.active_draft(review_id).await? {
            self.store.mark_reply_rejected(&draft.id).await?;
        }
        self.store.update_review_status(review_id, next).await?;
        info!(review_id, "reply rejected");
        Ok(next)
    }

    /// Generates a fresh AI draft for a `failed`, `rejected` or `skipped`
    /// review. The result is held for approval.
    pub async fn regenerate(&self, review_id: &str) -> Result<ReplyStatus, ReplywiseError> {
        let Some(_guard) = self.claim(review_id) else {
            return Err(ReplywiseError::InvalidTransition {
                from: "in_flight".to_string(),
                event: ReplyEvent::Regenerated.to_string(),
            });
        };
        let review = self.load_review(review_id).await?;
        let current = self.current_state(&review).await?;
        ReplyStateMachine::next(current, ReplyEvent::Regenerated)?;

        let business = self.load_business(&review.business_id).await?;
        let user_id = business.user_id.clone();
        self.run_round(Round::Regenerate, current, &review, &business, None, &user_id)
            .await
    }

    /// Stores a human-written draft. Manual drafts never consume quota.
    ///
    /// A review that was never processed accepts a manual draft, after
    /// which the pipeline leaves it alone.
    pub async fn draft_manually(
        &self,
        review_id: &str,
        text: &str,
        author: &str,
    ) -> Result<ReplyStatus, ReplywiseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ReplywiseError::Config("reply text must not be empty".to_string()));
        }
        let Some(_guard) = self.claim(review_id) else {
            return Err(ReplywiseError::InvalidTransition {
                from: "in_flight".to_string(),
                event: ReplyEvent::ManuallyDrafted.to_string(),
            });
        };
        let review = self.load_review(review_id).await?;
        let current = self.current_state(&review).await?;
        let next = ReplyStateMachine::next(current, ReplyEvent::ManuallyDrafted)?;

        let draft = ReplyRecord {
            id: uuid::Uuid::new_v4().to_string(),
            review_id: review_id.to_string(),
            text: text.to_string(),
            status: DraftStatus::Draft,
            origin: ReplyOrigin::HumanGenerated,
            quota_consuming: false,
            generated_at: now_timestamp(),
            posted_at: None,
            posted_by: None,
        };
        self.store.create_draft(&draft).await?;
        self.store.update_review_status(review_id, next).await?;
        info!(review_id, author, "manual draft stored");
        Ok(next)
    }

    // --- Round internals ---

    async fn run_round(
        &self,
        round: Round,
        current: Option<ReplyStatus>,
        review: &Review,
        business: &Business,
        account: Option<&PlatformAccount>,
        user_id: &str,
    ) -> Result<ReplyStatus, ReplywiseError> {
        let star = match business.config.star_config(review.rating) {
            Ok(star) => star,
            Err(e) => return self.fail(current, review, &e).await,
        };
        let auto_post = round == Round::Initial && should_auto_post(star);

        // Auto-post needs a token; check before spending quota.
        let publish_account = match (auto_post, account) {
            (false, _) => None,
            (true, Some(account)) if PublishClient::can_publish_for(account) => Some(account),
            (true, _) => {
                let err = ReplywiseError::Config(format!(
                    "auto-post enabled for {}-star reviews but account {} has no refresh token",
                    review.rating, business.account_id
                ));
                return self.fail(current, review, &err).await;
            }
        };

        if !review.quota_exempt {
            match self.quota.ensure(user_id).await {
                Ok(_) => {}
                Err(ReplywiseError::QuotaExceeded { current: used, limit }) => {
                    let next = ReplyStateMachine::next(current, ReplyEvent::QuotaBlocked)?;
                    self.store.update_review_status(&review.id, next).await?;
                    info!(
                        review_id = review.id.as_str(),
                        user_id,
                        current_count = used,
                        limit,
                        "reply generation blocked by quota"
                    );
                    record_reply(next);
                    return Ok(next);
                }
                Err(e) => return Err(e),
            }
        }

        let prompt = match self.prompts.build_prompt(
            &business.config,
            review,
            business.display_name(),
            business.config.contact_phone.as_deref(),
        ) {
            Ok(prompt) => prompt,
            Err(e) => return self.fail(current, review, &e).await,
        };

        let text = match self.generate(review, &prompt).await {
            Ok(text) => text,
            Err(e) => return self.fail(current, review, &e).await,
        };

        let draft = ReplyRecord {
            id: uuid::Uuid::new_v4().to_string(),
            review_id: review.id.clone(),
            text,
            status: DraftStatus::Draft,
            origin: ReplyOrigin::AiGenerated,
            quota_consuming: !review.quota_exempt,
            generated_at: now_timestamp(),
            posted_at: None,
            posted_by: None,
        };
        self.store.create_draft(&draft).await?;

        let Some(account) = publish_account else {
            let event = match round {
                Round::Initial => ReplyEvent::DraftHeld,
                Round::Regenerate => ReplyEvent::Regenerated,
            };
            let next = ReplyStateMachine::next(current, event)?;
            self.store.update_review_status(&review.id, next).await?;
            info!(review_id = review.id.as_str(), "draft held for approval");
            record_reply(next);
            self.notify(business, review, next, &draft.text).await;
            return Ok(next);
        };

        let publish_result = self
            .publisher
            .publish(account, business, review, &draft.text)
            .await;
        record_publish(&publish_result);
        match publish_result {
            Ok(_) => {
                self.store
                    .mark_reply_posted(&draft.id, &now_timestamp(), POSTED_BY_SYSTEM)
                    .await?;
                let next = ReplyStateMachine::next(current, ReplyEvent::AutoPosted)?;
                self.store.update_review_status(&review.id, next).await?;
                record_reply(next);
                self.notify(business, review, next, &draft.text).await;
                Ok(next)
            }
            // The draft stays live so a retry does not regenerate.
            Err(e) => self.fail(current, review, &e).await,
        }
    }

    async fn generate(&self, review: &Review, prompt: &str) -> Result<String, ReplywiseError> {
        let started = Instant::now();
        let timeout = self.settings.generation_timeout;
        let result = match tokio::time::timeout(timeout, self.generator.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(ReplywiseError::Generation {
                message: format!("generation timed out after {timeout:?}"),
                source: None,
            }),
        };
        let elapsed = started.elapsed().as_secs_f64();
        #[cfg(feature = "prometheus")]
        replywise_prometheus::record_generation_latency(elapsed);
        debug!(review_id = review.id.as_str(), elapsed_secs = elapsed, "generation finished");

        let text = result?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ReplywiseError::Generation {
                message: "generator returned empty text".to_string(),
                source: None,
            });
        }
        Ok(text.to_string())
    }

    /// Records `failed` for a review-local error.
    async fn fail(
        &self,
        current: Option<ReplyStatus>,
        review: &Review,
        error: &ReplywiseError,
    ) -> Result<ReplyStatus, ReplywiseError> {
        let next = ReplyStateMachine::next(current, ReplyEvent::ProcessingFailed)?;
        self.store.update_review_status(&review.id, next).await?;
        warn!(review_id = review.id.as_str(), error = %error, "reply processing failed");
        record_reply(next);
        Ok(next)
    }

    async fn notify(&self, business: &Business, review: &Review, status: ReplyStatus, text: &str) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let notice = ReplyNotice {
            user_id: business.user_id.clone(),
            business_id: business.id.clone(),
            review_id: review.id.clone(),
            rating: review.rating,
            status,
            reply_text: text.to_string(),
        };
        if let Err(e) = notifier.notify(&notice).await {
            warn!(review_id = review.id.as_str(), error = %e, "reply notification failed");
        }
    }

    /// `None` while the review has no outcome yet: status `pending` and no
    /// reply record of any kind.
    pub(crate) async fn current_state(&self, review: &Review) -> Result<Option<ReplyStatus>, ReplywiseError> {
        if review.reply_status != ReplyStatus::Pending {
            return Ok(Some(review.reply_status));
        }
        let replies = self.store.list_replies(&review.id).await?;
        Ok(if replies.is_empty() {
            None
        } else {
            Some(ReplyStatus::Pending)
        })
    }

    fn claim(&self, review_id: &str) -> Option<InFlightGuard<'_>> {
        let mut set = self.in_flight.lock().ok()?;
        if !set.insert(review_id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            set: &self.in_flight,
            review_id: review_id.to_string(),
        })
    }

    async fn load_review(&self, id: &str) -> Result<Review, ReplywiseError> {
        self.store
            .get_review(id)
            .await?
            .ok_or_else(|| ReplywiseError::not_found("review", id))
    }

    async fn load_business(&self, id: &str) -> Result<Business, ReplywiseError> {
        self.store
            .get_business(id)
            .await?
            .ok_or_else(|| ReplywiseError::not_found("business", id))
    }

    async fn load_account(&self, id: &str) -> Result<PlatformAccount, ReplywiseError> {
        self.store
            .get_account(id)
            .await?
            .ok_or_else(|| ReplywiseError::not_found("platform account", id))
    }
}

#[cfg(feature = "prometheus")]
fn record_reply(status: ReplyStatus) {
    replywise_prometheus::record_reply(&status.to_string());
}

#[cfg(not(feature = "prometheus"))]
fn record_reply(_status: ReplyStatus) {}

#[cfg(feature = "prometheus")]
fn record_publish<T>(result: &Result<T, ReplywiseError>) {
    let outcome = match result {
        Ok(_) => "success".to_string(),
        Err(ReplywiseError::Publish { kind, .. }) => kind.to_string(),
        Err(_) => "error".to_string(),
    };
    replywise_prometheus::record_publish(&outcome);
}

#[cfg(not(feature = "prometheus"))]
fn record_publish<T>(_result: &Result<T, ReplywiseError>) {}
