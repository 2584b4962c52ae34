// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply publishing with per-use token decryption.

use std::sync::Arc;
use std::time::Duration;

use replywise_core::error::{PublishErrorKind, ReplywiseError};
use replywise_core::traits::ReviewPlatform;
use replywise_core::types::{AccessToken, Business, PlatformAccount, PostedReply, Review};
use replywise_vault::TokenCipher;
use secrecy::ExposeSecret;
use tracing::{info, warn};

/// Publishes replies on behalf of a platform account.
///
/// The account's sealed refresh token is opened, exchanged for an access
/// token and discarded on every call; nothing is cached between reviews.
/// The whole refresh-and-post sequence runs under one timeout, and a timeout
/// is reported as a transport failure.
#[derive(Clone)]
pub struct PublishClient {
    platform: Arc<dyn ReviewPlatform>,
    cipher: Option<TokenCipher>,
    timeout: Duration,
}

impl PublishClient {
    /// `cipher` is `None` when no token key is configured; every publish then
    /// fails as unauthorized.
    pub fn new(
        platform: Arc<dyn ReviewPlatform>,
        cipher: Option<TokenCipher>,
        timeout: Duration,
    ) -> Self {
        Self {
            platform,
            cipher,
            timeout,
        }
    }

    pub fn platform(&self) -> &Arc<dyn ReviewPlatform> {
        &self.platform
    }

    /// True when the account has a stored refresh token.
    pub fn can_publish_for(account: &PlatformAccount) -> bool {
        account.sealed_refresh_token.is_some()
    }

    /// Decrypts the account's refresh token and exchanges it for an access token.
    pub async fn access_token(
        &self,
        account: &PlatformAccount,
    ) -> Result<AccessToken, ReplywiseError> {
        let sealed = account.sealed_refresh_token.as_ref().ok_or_else(|| {
            ReplywiseError::Config(format!(
                "platform account {} has no refresh token",
                account.id
            ))
        })?;
        let cipher = self.cipher.as_ref().ok_or_else(|| ReplywiseError::Publish {
            kind: PublishErrorKind::Unauthorized,
            message: "vault.token_key is not configured".to_string(),
        })?;

        let refresh_token = cipher.open_token(&account.id, sealed)?;
        self.platform
            .refresh_access_token(refresh_token.expose_secret())
            .await
    }

    /// Posts `text` as the reply to `review`.
    pub async fn publish(
        &self,
        account: &PlatformAccount,
        business: &Business,
        review: &Review,
        text: &str,
    ) -> Result<PostedReply, ReplywiseError> {
        let resource_name = business.review_resource_name(&review.external_review_id);
        let attempt = async {
            let token = self.access_token(account).await?;
            self.platform.post_reply(&token, &resource_name, text).await
        };

        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(posted)) => {
                info!(
                    review_id = review.id.as_str(),
                    business_id = business.id.as_str(),
                    "reply published"
                );
                Ok(posted)
            }
            Ok(Err(e)) => {
                warn!(review_id = review.id.as_str(), error = %e, "reply publish failed");
                Err(e)
            }
            Err(_) => {
                warn!(
                    review_id = review.id.as_str(),
                    timeout_secs = self.timeout.as_secs(),
                    "reply publish timed out"
                );
                Err(ReplywiseError::Publish {
                    kind: PublishErrorKind::Transport,
                    message: format!("publish timed out after {:?}", self.timeout),
                })
            }
        }
    }
}
