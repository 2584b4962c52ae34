// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review platform trait (listing reviews and posting replies).

use async_trait::async_trait;

use crate::error::ReplywiseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AccessToken, PostedReply, ReviewPage};

/// Client for the external review platform.
///
/// All operations take plaintext credentials; decryption of stored refresh
/// tokens happens in the caller immediately before use.
#[async_trait]
pub trait ReviewPlatform: PluginAdapter {
    /// Exchanges a refresh token for a short-lived access token.
    ///
    /// A refused refresh yields `Publish { kind: Unauthorized, .. }`.
    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<AccessToken, ReplywiseError>;

    /// Lists one page of reviews for a location, newest first.
    async fn list_reviews(
        &self,
        access_token: &AccessToken,
        location_name: &str,
        page_token: Option<&str>,
    ) -> Result<ReviewPage, ReplywiseError>;

    /// Creates or replaces the owner reply on a review.
    async fn post_reply(
        &self,
        access_token: &AccessToken,
        review_resource_name: &str,
        text: &str,
    ) -> Result<PostedReply, ReplywiseError>;
}
