// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idempotent review ingestion from webhook notifications and imports.

use std::sync::Arc;

use replywise_core::time::{normalize_timestamp, now_timestamp};
use replywise_core::types::{InsertOutcome, ReplyStatus, Review, ReviewPayload, StarRating};
use replywise_core::{ReplywiseError, ReviewStore};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info};

/// Where a review delivery came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum IngestOrigin {
    Webhook,
    Import,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// False when the review was already stored.
    pub created: bool,
    /// The stored review, including any text correction just applied.
    pub review: Review,
}

/// Push notification for a single new or edited review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewNotification {
    pub review_id: String,
    pub rating: StarRating,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub attributes: NotificationAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAttributes {
    pub business_id: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

impl ReviewNotification {
    /// Splits the notification into its business id and a normalized payload.
    /// Missing timestamps default to now.
    pub fn into_payload(self) -> Result<(String, ReviewPayload), ReplywiseError> {
        let submitted_at = match self.attributes.create_time.as_deref() {
            Some(raw) => normalize_timestamp(raw)?,
            None => now_timestamp(),
        };
        let updated_at = match self.attributes.update_time.as_deref() {
            Some(raw) => normalize_timestamp(raw)?,
            None => submitted_at.clone(),
        };
        let reviewer_name = self
            .reviewer_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "A customer".to_string());

        Ok((
            self.attributes.business_id,
            ReviewPayload {
                external_review_id: self.review_id,
                reviewer_name,
                reviewer_photo_url: self.attributes.photo_url,
                rating: self.rating,
                comment: self.comment,
                submitted_at,
                updated_at,
                is_anonymous: self.attributes.anonymous,
                existing_reply: None,
            },
        ))
    }
}

/// Persists each `(business, external review id)` at most once.
///
/// Duplicates are an expected result of at-least-once delivery and are
/// reported as `created = false`, never as an error.
#[derive(Clone)]
pub struct IngestionDeduplicator {
    store: Arc<dyn ReviewStore>,
}

impl IngestionDeduplicator {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    pub async fn ingest(
        &self,
        business_id: &str,
        payload: &ReviewPayload,
        origin: IngestOrigin,
        quota_exempt: bool,
    ) -> Result<IngestOutcome, ReplywiseError> {
        let review = Review {
            id: uuid::Uuid::new_v4().to_string(),
            business_id: business_id.to_string(),
            external_review_id: payload.external_review_id.clone(),
            reviewer_name: payload.reviewer_name.clone(),
            reviewer_photo_url: payload.reviewer_photo_url.clone(),
            rating: payload.rating,
            comment: payload.comment.clone(),
            submitted_at: payload.submitted_at.clone(),
            updated_at: payload.updated_at.clone(),
            is_anonymous: payload.is_anonymous,
            ingested_at: now_timestamp(),
            reply_status: ReplyStatus::Pending,
            quota_exempt,
        };

        let outcome = self.store.insert_review_if_absent(&review).await?;
        #[cfg(feature = "prometheus")]
        replywise_prometheus::record_ingestion(
            &origin.to_string(),
            match outcome {
                InsertOutcome::Inserted => "created",
                InsertOutcome::AlreadyExists => "duplicate",
            },
        );

        match outcome {
            InsertOutcome::Inserted => {
                info!(
                    review_id = review.id.as_str(),
                    business_id,
                    external_review_id = review.external_review_id.as_str(),
                    %origin,
                    "review ingested"
                );
                Ok(IngestOutcome {
                    created: true,
                    review,
                })
            }
            InsertOutcome::AlreadyExists => {
                let existing = self
                    .store
                    .get_review_by_external_id(business_id, &payload.external_review_id)
                    .await?
                    .ok_or_else(|| {
                        ReplywiseError::Internal(format!(
                            "review {} reported as existing but not found",
                            payload.external_review_id
                        ))
                    })?;
                let review = self.apply_correction(existing, payload).await?;
                debug!(
                    review_id = review.id.as_str(),
                    external_review_id = review.external_review_id.as_str(),
                    %origin,
                    "duplicate review delivery ignored"
                );
                Ok(IngestOutcome {
                    created: false,
                    review,
                })
            }
        }
    }

    /// Ingests a webhook notification.
    pub async fn ingest_notification(
        &self,
        notification: ReviewNotification,
    ) -> Result<IngestOutcome, ReplywiseError> {
        let (business_id, payload) = notification.into_payload()?;
        self.ingest(&business_id, &payload, IngestOrigin::Webhook, false)
            .await
    }

    /// Applies the platform's edit when the delivery is newer than the
    /// stored review.
    async fn apply_correction(
        &self,
        mut existing: Review,
        payload: &ReviewPayload,
    ) -> Result<Review, ReplywiseError> {
        if payload.updated_at <= existing.updated_at {
            return Ok(existing);
        }
        self.store
            .update_review_text(
                &existing.id,
                payload.comment.as_deref(),
                payload.rating,
                &payload.updated_at,
            )
            .await?;
        info!(
            review_id = existing.id.as_str(),
            updated_at = payload.updated_at.as_str(),
            "review text corrected from platform"
        );
        existing.comment = payload.comment.clone();
        existing.rating = payload.rating;
        existing.updated_at = payload.updated_at.clone();
        Ok(existing)
    }
}
