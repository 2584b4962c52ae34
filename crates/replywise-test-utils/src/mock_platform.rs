// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory review platform.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use replywise_core::types::{
    AccessToken, AdapterType, ExistingReply, HealthStatus, PlatformReview, PostedReply,
    ReviewPage, ReviewPayload, StarRating,
};
use replywise_core::{PluginAdapter, PublishErrorKind, ReplywiseError, ReviewPlatform};

pub const MOCK_ACCESS_TOKEN: &str = "mock-access-token";

/// A recorded reply post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedCall {
    pub resource_name: String,
    pub text: String,
}

/// Scripted outcome of a reply post.
#[derive(Debug, Clone)]
pub enum PostOutcome {
    Accept,
    Fail(PublishErrorKind),
    Delay(Duration),
}

#[derive(Default)]
struct State {
    pages: Vec<Vec<PlatformReview>>,
    fail_listing_at: Option<usize>,
    refresh_error: Option<PublishErrorKind>,
    post_outcomes: VecDeque<PostOutcome>,
    refresh_tokens: Vec<String>,
    list_calls: usize,
    posts: Vec<PostedCall>,
}

/// Serves scripted listing pages and records refreshes and posts.
///
/// Page `i` carries the next-page token `page-{i+1}` unless it is the
/// last one.
#[derive(Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<State>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_pages(&self, pages: Vec<Vec<PlatformReview>>) {
        self.state.lock().await.pages = pages;
    }

    /// Listing page `index` (0-based) returns a transport error.
    pub async fn fail_listing_at(&self, index: usize) {
        self.state.lock().await.fail_listing_at = Some(index);
    }

    pub async fn fail_refresh(&self, kind: PublishErrorKind) {
        self.state.lock().await.refresh_error = Some(kind);
    }

    /// Queues the outcome of the next reply post. Unscripted posts succeed.
    pub async fn push_post_outcome(&self, outcome: PostOutcome) {
        self.state.lock().await.post_outcomes.push_back(outcome);
    }

    pub async fn posts(&self) -> Vec<PostedCall> {
        self.state.lock().await.posts.clone()
    }

    /// Decrypted refresh tokens presented, one per refresh.
    pub async fn refresh_tokens(&self) -> Vec<String> {
        self.state.lock().await.refresh_tokens.clone()
    }

    pub async fn list_calls(&self) -> usize {
        self.state.lock().await.list_calls
    }
}

/// Builds a listed review.
pub fn listed_review(
    location_name: &str,
    external_id: &str,
    rating: u8,
    comment: Option<&str>,
    existing_reply: Option<&str>,
) -> PlatformReview {
    let at = "2026-01-10T09:00:00.000Z".to_string();
    PlatformReview {
        resource_name: format!("{location_name}/reviews/{external_id}"),
        payload: ReviewPayload {
            external_review_id: external_id.to_string(),
            reviewer_name: format!("Reviewer {external_id}"),
            reviewer_photo_url: None,
            rating: StarRating::try_from(rating).unwrap_or(StarRating::ALL[4]),
            comment: comment.map(str::to_string),
            submitted_at: at.clone(),
            updated_at: at.clone(),
            is_anonymous: false,
            existing_reply: existing_reply.map(|text| ExistingReply {
                text: text.to_string(),
                updated_at: "2026-01-11T09:00:00.000Z".to_string(),
            }),
        },
    }
}

#[async_trait]
impl PluginAdapter for MockPlatform {
    fn name(&self) -> &str {
        "mock-platform"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Platform
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplywiseError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReplywiseError> {
        Ok(())
    }
}

#[async_trait]
impl ReviewPlatform for MockPlatform {
    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<AccessToken, ReplywiseError> {
        let mut state = self.state.lock().await;
        state.refresh_tokens.push(refresh_token.to_string());
        if let Some(kind) = state.refresh_error {
            return Err(ReplywiseError::Publish {
                kind,
                message: "mock refresh failure".to_string(),
            });
        }
        Ok(AccessToken {
            token: MOCK_ACCESS_TOKEN.to_string(),
            expires_in_secs: Some(3600),
        })
    }

    async fn list_reviews(
        &self,
        _access_token: &AccessToken,
        _location_name: &str,
        page_token: Option<&str>,
    ) -> Result<ReviewPage, ReplywiseError> {
        let mut state = self.state.lock().await;
        state.list_calls += 1;
        let index = page_token
            .and_then(|t| t.strip_prefix("page-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);

        if state.fail_listing_at == Some(index) {
            return Err(ReplywiseError::Transport {
                message: format!("mock listing failure on page {index}"),
                source: None,
            });
        }

        let reviews = state.pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < state.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(ReviewPage {
            reviews,
            next_page_token,
        })
    }

    async fn post_reply(
        &self,
        _access_token: &AccessToken,
        review_resource_name: &str,
        text: &str,
    ) -> Result<PostedReply, ReplywiseError> {
        let outcome = {
            let mut state = self.state.lock().await;
            state.posts.push(PostedCall {
                resource_name: review_resource_name.to_string(),
                text: text.to_string(),
            });
            state.post_outcomes.pop_front().unwrap_or(PostOutcome::Accept)
        };
        match outcome {
            PostOutcome::Accept => {}
            PostOutcome::Fail(kind) => {
                return Err(ReplywiseError::Publish {
                    kind,
                    message: format!("mock publish failure ({kind})"),
                });
            }
            PostOutcome::Delay(delay) => tokio::time::sleep(delay).await,
        }
        Ok(PostedReply {
            text: text.to_string(),
            updated_at: None,
        })
    }
}
