// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON shapes exchanged with the review platform and its OAuth endpoint.

use replywise_core::error::ReplywiseError;
use replywise_core::time::normalize_timestamp;
use replywise_core::types::{ExistingReply, PlatformReview, ReviewPayload, StarRating};
use serde::{Deserialize, Serialize};

/// Response of `GET {location}/reviews`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReviewsResponse {
    #[serde(default)]
    pub reviews: Vec<WireReview>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub total_review_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireReview {
    /// Full resource name, e.g. `accounts/1/locations/2/reviews/abc`.
    #[serde(default)]
    pub name: Option<String>,
    pub review_id: String,
    #[serde(default)]
    pub reviewer: WireReviewer,
    pub star_rating: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub create_time: String,
    #[serde(default)]
    pub update_time: Option<String>,
    #[serde(default)]
    pub review_reply: Option<WireReply>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireReviewer {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireReply {
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// Body of `PUT {review}/reply`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReplyRequest<'a> {
    pub comment: &'a str,
}

/// OAuth token endpoint response to a refresh grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Error envelope used by the platform API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Parses the platform's `ONE`..`FIVE` rating enum.
pub fn parse_star_rating(value: &str) -> Result<StarRating, ReplywiseError> {
    let stars = match value {
        "ONE" => 1,
        "TWO" => 2,
        "THREE" => 3,
        "FOUR" => 4,
        "FIVE" => 5,
        other => {
            return Err(ReplywiseError::Transport {
                message: format!("unsupported star rating `{other}`"),
                source: None,
            });
        }
    };
    StarRating::try_from(stars)
}

impl WireReview {
    /// Converts into the platform-neutral review shape.
    ///
    /// `location_name` is used to build the resource name when the listing
    /// omits it.
    pub fn into_platform_review(
        self,
        location_name: &str,
    ) -> Result<PlatformReview, ReplywiseError> {
        let rating = parse_star_rating(&self.star_rating)?;
        let submitted_at = normalize_timestamp(&self.create_time)?;
        let updated_at = match self.update_time.as_deref() {
            Some(at) => normalize_timestamp(at)?,
            None => submitted_at.clone(),
        };
        let existing_reply = match self.review_reply {
            Some(reply) => Some(ExistingReply {
                updated_at: match reply.update_time.as_deref() {
                    Some(at) => normalize_timestamp(at)?,
                    None => updated_at.clone(),
                },
                text: reply.comment,
            }),
            None => None,
        };
        let resource_name = self
            .name
            .unwrap_or_else(|| format!("{location_name}/reviews/{}", self.review_id));

        Ok(PlatformReview {
            resource_name,
            payload: ReviewPayload {
                external_review_id: self.review_id,
                reviewer_name: self
                    .reviewer
                    .display_name
                    .unwrap_or_else(|| "A customer".to_string()),
                reviewer_photo_url: self.reviewer.profile_photo_url,
                rating,
                comment: self.comment,
                submitted_at,
                updated_at,
                is_anonymous: self.reviewer.is_anonymous,
                existing_reply,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_page_converts() {
        let body = serde_json::json!({
            "reviews": [{
                "reviewId": "r-1",
                "reviewer": {"displayName": "Ana", "profilePhotoUrl": "https://p/1.png"},
                "starRating": "FOUR",
                "comment": "Lovely",
                "createTime": "2026-01-02T03:04:05.678901Z",
                "updateTime": "2026-01-03T03:04:05Z",
                "reviewReply": {"comment": "Thanks Ana", "updateTime": "2026-01-04T00:00:00Z"}
            }],
            "nextPageToken": "page-2"
        });
        let page: ListReviewsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("page-2"));

        let review = page
            .reviews
            .into_iter()
            .next()
            .unwrap()
            .into_platform_review("accounts/1/locations/2")
            .unwrap();
        assert_eq!(review.resource_name, "accounts/1/locations/2/reviews/r-1");
        assert_eq!(review.payload.rating.value(), 4);
        assert_eq!(review.payload.submitted_at, "2026-01-02T03:04:05.678Z");
        assert_eq!(review.payload.updated_at, "2026-01-03T03:04:05.000Z");
        let reply = review.payload.existing_reply.unwrap();
        assert_eq!(reply.text, "Thanks Ana");
        assert_eq!(reply.updated_at, "2026-01-04T00:00:00.000Z");
    }

    #[test]
    fn anonymous_reviewer_without_name() {
        let wire: WireReview = serde_json::from_value(serde_json::json!({
            "reviewId": "r-2",
            "reviewer": {"isAnonymous": true},
            "starRating": "ONE",
            "createTime": "2026-01-02T03:04:05Z"
        }))
        .unwrap();
        let review = wire.into_platform_review("accounts/1/locations/2").unwrap();
        assert!(review.payload.is_anonymous);
        assert_eq!(review.payload.reviewer_name, "A customer");
        assert!(review.payload.comment.is_none());
        assert_eq!(review.payload.updated_at, review.payload.submitted_at);
    }

    #[test]
    fn unspecified_rating_is_rejected() {
        assert!(parse_star_rating("STAR_RATING_UNSPECIFIED").is_err());
        assert_eq!(parse_star_rating("FIVE").unwrap().value(), 5);
    }
}
