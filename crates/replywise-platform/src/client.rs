// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the review platform API.

use std::time::Duration;

use async_trait::async_trait;
use replywise_config::model::PlatformConfig;
use replywise_core::error::{PublishErrorKind, ReplywiseError};
use replywise_core::traits::{PluginAdapter, ReviewPlatform};
use replywise_core::types::{AccessToken, AdapterType, HealthStatus, PostedReply, ReviewPage};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::wire::{
    ApiErrorEnvelope, ListReviewsResponse, TokenRefreshResponse, UpdateReplyRequest, WireReply,
};

/// Maps an HTTP error status from the platform to the publish taxonomy.
pub fn classify_status(status: StatusCode) -> PublishErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PublishErrorKind::Unauthorized,
        StatusCode::NOT_FOUND => PublishErrorKind::NotFound,
        StatusCode::TOO_MANY_REQUESTS => PublishErrorKind::RateLimited,
        s if s.is_server_error() => PublishErrorKind::Upstream,
        _ => PublishErrorKind::Rejected,
    }
}

fn transport_kind(err: &reqwest::Error) -> PublishErrorKind {
    match err.status() {
        Some(status) => classify_status(status),
        None => PublishErrorKind::Transport,
    }
}

/// Review platform adapter speaking the Business Profile style REST API.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: reqwest::Client,
    api_base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    page_size: u32,
}

impl PlatformClient {
    pub fn new(config: &PlatformConfig) -> Result<Self, ReplywiseError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReplywiseError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(
            api_base_url = config.api_base_url.as_str(),
            page_size = config.page_size,
            "review platform client initialized"
        );
        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone().unwrap_or_default(),
            client_secret: config.client_secret.clone().unwrap_or_default(),
            page_size: config.page_size,
        })
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("{}/v4/{}", self.api_base_url, resource.trim_start_matches('/'))
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorEnvelope>(&body) {
            Ok(envelope) => format!(
                "platform returned {status} ({}): {}",
                envelope.error.status.unwrap_or_default(),
                envelope.error.message
            ),
            Err(_) => format!("platform returned {status}: {body}"),
        }
    }
}

#[async_trait]
impl PluginAdapter for PlatformClient {
    fn name(&self) -> &str {
        "review-platform"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Platform
    }

    async fn health_check(&self) -> Result<HealthStatus, ReplywiseError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Ok(HealthStatus::Degraded(
                "platform OAuth client credentials are not configured".to_string(),
            ));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReplywiseError> {
        debug!("review platform client shutting down");
        Ok(())
    }
}

#[async_trait]
impl ReviewPlatform for PlatformClient {
    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<AccessToken, ReplywiseError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ReplywiseError::Publish {
                kind: PublishErrorKind::Transport,
                message: format!("token refresh request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            warn!(status = %status, "token refresh rejected");
            // The token endpoint answers 400 invalid_grant for revoked tokens.
            let kind = match status {
                StatusCode::BAD_REQUEST => PublishErrorKind::Unauthorized,
                other => classify_status(other),
            };
            return Err(ReplywiseError::Publish {
                kind,
                message: format!("token refresh failed: {message}"),
            });
        }

        let token: TokenRefreshResponse =
            response.json().await.map_err(|e| ReplywiseError::Publish {
                kind: PublishErrorKind::Transport,
                message: format!("malformed token refresh response: {e}"),
            })?;
        debug!(expires_in = token.expires_in, "access token refreshed");

        Ok(AccessToken {
            token: token.access_token,
            expires_in_secs: token.expires_in,
        })
    }

    async fn list_reviews(
        &self,
        access_token: &AccessToken,
        location_name: &str,
        page_token: Option<&str>,
    ) -> Result<ReviewPage, ReplywiseError> {
        let url = self.resource_url(&format!("{location_name}/reviews"));
        let page_size = self.page_size.to_string();
        let mut query = vec![
            ("pageSize", page_size.as_str()),
            ("orderBy", "updateTime desc"),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&access_token.token)
            .query(&query)
            .send()
            .await
            .map_err(|e| ReplywiseError::Transport {
                message: format!("review listing request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            return Err(ReplywiseError::Transport {
                message: Self::error_message(response).await,
                source: None,
            });
        }

        let listing: ListReviewsResponse =
            response.json().await.map_err(|e| ReplywiseError::Transport {
                message: format!("malformed review listing: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut reviews = Vec::with_capacity(listing.reviews.len());
        for wire in listing.reviews {
            let review_id = wire.review_id.clone();
            match wire.into_platform_review(location_name) {
                Ok(review) => reviews.push(review),
                Err(e) => warn!(review_id = review_id.as_str(), error = %e, "skipping unreadable review"),
            }
        }
        debug!(
            location = location_name,
            count = reviews.len(),
            has_next = listing.next_page_token.is_some(),
            "review page fetched"
        );

        Ok(ReviewPage {
            reviews,
            next_page_token: listing.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn post_reply(
        &self,
        access_token: &AccessToken,
        review_resource_name: &str,
        text: &str,
    ) -> Result<PostedReply, ReplywiseError> {
        let url = self.resource_url(&format!("{review_resource_name}/reply"));
        let response = self
            .client
            .put(&url)
            .bearer_auth(&access_token.token)
            .json(&UpdateReplyRequest { comment: text })
            .send()
            .await
            .map_err(|e| ReplywiseError::Publish {
                kind: transport_kind(&e),
                message: format!("reply post failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReplywiseError::Publish {
                kind: classify_status(status),
                message: Self::error_message(response).await,
            });
        }

        let reply: WireReply = response.json().await.map_err(|e| ReplywiseError::Publish {
            kind: PublishErrorKind::Transport,
            message: format!("malformed reply confirmation: {e}"),
        })?;
        Ok(PostedReply {
            text: reply.comment,
            updated_at: reply.update_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            PublishErrorKind::Unauthorized
        );
        assert_eq!(classify_status(StatusCode::FORBIDDEN), PublishErrorKind::Unauthorized);
        assert_eq!(classify_status(StatusCode::NOT_FOUND), PublishErrorKind::NotFound);
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            PublishErrorKind::RateLimited
        );
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), PublishErrorKind::Upstream);
        assert_eq!(
            classify_status(StatusCode::UNPROCESSABLE_ENTITY),
            PublishErrorKind::Rejected
        );
    }

    #[test]
    fn resource_urls_are_versioned() {
        let client = PlatformClient::new(&PlatformConfig {
            api_base_url: "http://localhost:9000/".into(),
            ..PlatformConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.resource_url("accounts/1/locations/2/reviews"),
            "http://localhost:9000/v4/accounts/1/locations/2/reviews"
        );
    }
}
