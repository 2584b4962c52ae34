// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the reply pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ReplywiseError;

/// Poster identity recorded when the pipeline publishes on its own.
pub const POSTED_BY_SYSTEM: &str = "system";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Generator,
    Platform,
    Notifier,
    Observability,
}

// --- Ratings and statuses ---

/// A star rating in the range 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StarRating(u8);

impl StarRating {
    /// All ratings in ascending order.
    pub const ALL: [StarRating; 5] = [
        StarRating(1),
        StarRating(2),
        StarRating(3),
        StarRating(4),
        StarRating(5),
    ];

    /// Returns the numeric value (1..=5).
    pub fn value(self) -> u8 {
        self.0
    }

    /// One and two stars are treated as negative reviews.
    pub fn is_negative(self) -> bool {
        self.0 <= 2
    }
}

impl TryFrom<u8> for StarRating {
    type Error = ReplywiseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ReplywiseError::Config(format!(
                "star rating must be between 1 and 5, got {value}"
            )))
        }
    }
}

impl From<StarRating> for u8 {
    fn from(rating: StarRating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for StarRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reply state of a review.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    /// Awaiting a human decision.
    Pending,
    /// Cleared by a human, not yet posted.
    Approved,
    /// Published on the review platform.
    Posted,
    /// Discarded by a human; a new draft may follow.
    Rejected,
    /// Generation or publish error.
    Failed,
    /// Blocked before generation by the monthly allowance.
    QuotaExceeded,
    /// Business rule disabled reply generation and no manual path exists yet.
    Skipped,
}

/// Lifecycle of a single reply record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Draft,
    Posted,
    Rejected,
}

/// Where a reply's text came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReplyOrigin {
    AiGenerated,
    HumanGenerated,
    Imported,
}

// --- Business configuration ---

/// Voice the generated replies should use.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Casual,
    Formal,
    Enthusiastic,
}

/// How the reply language is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LanguageMode {
    /// Always reply in the given language.
    Fixed { language: String },
    /// Let the model detect the review's language.
    #[default]
    AutoDetect,
    /// Reply in whatever language the reviewer wrote in.
    MatchReviewer,
}

/// Per-rating override of auto-post behavior and drafting instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarConfig {
    pub rating: StarRating,
    #[serde(default)]
    pub custom_instructions: String,
    #[serde(default)]
    pub auto_reply: bool,
}

/// Per-business settings controlling reply generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessConfig {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Phone number offered to unhappy reviewers.
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub use_emojis: bool,
    #[serde(default)]
    pub allowed_emojis: Vec<String>,
    #[serde(default)]
    pub language: LanguageMode,
    #[serde(default)]
    pub max_sentences: Option<u32>,
    #[serde(default)]
    pub signature: Option<String>,
    /// Replaces the default prompt template when set.
    #[serde(default)]
    pub prompt_template: Option<String>,
    #[serde(default)]
    pub star_configs: Vec<StarConfig>,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            display_name: None,
            description: None,
            contact_phone: None,
            tone: Tone::default(),
            use_emojis: false,
            allowed_emojis: Vec::new(),
            language: LanguageMode::default(),
            max_sentences: None,
            signature: None,
            prompt_template: None,
            star_configs: StarRating::ALL
                .iter()
                .map(|&rating| StarConfig {
                    rating,
                    custom_instructions: String::new(),
                    auto_reply: false,
                })
                .collect(),
        }
    }
}

impl BusinessConfig {
    /// Returns the StarConfig for `rating`.
    ///
    /// A missing entry is a configuration error, as is a duplicated one.
    pub fn star_config(&self, rating: StarRating) -> Result<&StarConfig, ReplywiseError> {
        let mut matches = self.star_configs.iter().filter(|c| c.rating == rating);
        match (matches.next(), matches.next()) {
            (Some(config), None) => Ok(config),
            (None, _) => Err(ReplywiseError::Config(format!(
                "no star config for rating {rating}"
            ))),
            (Some(_), Some(_)) => Err(ReplywiseError::Config(format!(
                "duplicate star config for rating {rating}"
            ))),
        }
    }

    /// Checks that exactly one StarConfig exists for each rating 1..=5.
    pub fn validate(&self) -> Result<(), ReplywiseError> {
        for rating in StarRating::ALL {
            self.star_config(rating)?;
        }
        Ok(())
    }

    /// Mutable access used by dashboards and tests to tweak one rating.
    pub fn star_config_mut(&mut self, rating: StarRating) -> Option<&mut StarConfig> {
        self.star_configs.iter_mut().find(|c| c.rating == rating)
    }
}

// --- Businesses and accounts ---

/// A business whose reviews are answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    /// Owner; quota is counted per user across all their businesses.
    pub user_id: String,
    pub account_id: String,
    pub name: String,
    /// Platform location resource, e.g. `accounts/1/locations/2`.
    pub location_name: String,
    pub config: BusinessConfig,
}

impl Business {
    /// Platform resource identifier of one of this business's reviews.
    pub fn review_resource_name(&self, external_review_id: &str) -> String {
        format!("{}/reviews/{}", self.location_name, external_review_id)
    }

    /// Name shown in replies: the configured override, else the listing name.
    pub fn display_name(&self) -> &str {
        self.config
            .display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// An AES-256-GCM sealed secret with its nonce.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedToken {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; 12],
}

impl std::fmt::Debug for SealedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedToken")
            .field("ciphertext", &format_args!("[{} bytes]", self.ciphertext.len()))
            .finish()
    }
}

/// A connected review-platform account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformAccount {
    pub id: String,
    pub user_id: String,
    /// Encrypted OAuth refresh token. `None` when the owner never connected.
    pub sealed_refresh_token: Option<SealedToken>,
}

/// A user's billing plan, as far as the pipeline cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaLimit {
    Unlimited,
    Monthly(u32),
}

impl QuotaLimit {
    /// Sentinel used by the billing layer for unlimited plans.
    pub const UNLIMITED_SENTINEL: i64 = -1;

    /// Parses the stored plan limit, where `-1` means unlimited.
    pub fn from_sentinel(value: i64) -> Result<Self, ReplywiseError> {
        match value {
            Self::UNLIMITED_SENTINEL => Ok(Self::Unlimited),
            v if v >= 0 => u32::try_from(v)
                .map(Self::Monthly)
                .map_err(|_| ReplywiseError::Config(format!("quota limit {v} out of range"))),
            v => Err(ReplywiseError::Config(format!(
                "quota limit must be -1 or non-negative, got {v}"
            ))),
        }
    }

    /// Inverse of [`QuotaLimit::from_sentinel`].
    pub fn to_sentinel(self) -> i64 {
        match self {
            Self::Unlimited => Self::UNLIMITED_SENTINEL,
            Self::Monthly(n) => i64::from(n),
        }
    }
}

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCheck {
    pub allowed: bool,
    pub current_count: u64,
    pub limit: QuotaLimit,
}

// --- Reviews and replies ---

/// A reply the platform already carries for a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingReply {
    pub text: String,
    pub updated_at: String,
}

/// A review as received from the platform, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPayload {
    pub external_review_id: String,
    pub reviewer_name: String,
    #[serde(default)]
    pub reviewer_photo_url: Option<String>,
    pub rating: StarRating,
    #[serde(default)]
    pub comment: Option<String>,
    pub submitted_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub existing_reply: Option<ExistingReply>,
}

/// A persisted customer review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub business_id: String,
    /// Unique per business.
    pub external_review_id: String,
    pub reviewer_name: String,
    pub reviewer_photo_url: Option<String>,
    pub rating: StarRating,
    pub comment: Option<String>,
    pub submitted_at: String,
    pub updated_at: String,
    pub is_anonymous: bool,
    pub ingested_at: String,
    pub reply_status: ReplyStatus,
    /// Exempt reviews bypass the quota gate and are never counted.
    pub quota_exempt: bool,
}

impl Review {
    /// Review text with surrounding whitespace removed, `None` when blank.
    pub fn text(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// A drafted or posted reply to a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRecord {
    pub id: String,
    pub review_id: String,
    pub text: String,
    pub status: DraftStatus,
    pub origin: ReplyOrigin,
    /// Counted against the owner's monthly allowance.
    pub quota_consuming: bool,
    pub generated_at: String,
    pub posted_at: Option<String>,
    /// `system` or a human user id.
    pub posted_by: Option<String>,
}

/// Result of an atomic insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

// --- Platform wire-independent types ---

/// A short-lived platform access token.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_in_secs: Option<u64>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[redacted]")
            .field("expires_in_secs", &self.expires_in_secs)
            .finish()
    }
}

/// One review from a platform listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformReview {
    /// Platform resource identifier used when posting a reply.
    pub resource_name: String,
    pub payload: ReviewPayload,
}

/// One page of a platform review listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPage {
    pub reviews: Vec<PlatformReview>,
    pub next_page_token: Option<String>,
}

/// Confirmation returned by the platform after a reply post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedReply {
    pub text: String,
    pub updated_at: Option<String>,
}

// --- Pipeline triggers ---

/// Internal trigger that runs the reply pipeline for one review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub user_id: String,
    pub account_id: String,
    pub business_id: String,
    pub review_id: String,
}

/// Status a review ended in after one pipeline round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub reply_status: ReplyStatus,
}

/// Notification fired after a pipeline round reaches `pending` or `posted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyNotice {
    pub user_id: String,
    pub business_id: String,
    pub review_id: String,
    pub rating: StarRating,
    pub status: ReplyStatus,
    pub reply_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn star_rating_bounds() {
        assert!(StarRating::try_from(0).is_err());
        assert!(StarRating::try_from(6).is_err());
        assert_eq!(StarRating::try_from(3).unwrap().value(), 3);
        assert!(StarRating::try_from(2).unwrap().is_negative());
        assert!(!StarRating::try_from(3).unwrap().is_negative());
    }

    #[test]
    fn star_rating_rejects_out_of_range_json() {
        let err = serde_json::from_str::<StarRating>("7");
        assert!(err.is_err());
        let ok: StarRating = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
    }

    #[test]
    fn reply_status_string_forms() {
        assert_eq!(ReplyStatus::QuotaExceeded.to_string(), "quota_exceeded");
        assert_eq!(
            ReplyStatus::from_str("quota_exceeded").unwrap(),
            ReplyStatus::QuotaExceeded
        );
        let json = serde_json::to_string(&ReplyStatus::Posted).unwrap();
        assert_eq!(json, "\"posted\"");
    }

    #[test]
    fn default_business_config_has_all_ratings() {
        let config = BusinessConfig::default();
        assert!(config.validate().is_ok());
        for rating in StarRating::ALL {
            assert!(!config.star_config(rating).unwrap().auto_reply);
        }
    }

    #[test]
    fn missing_star_config_is_configuration_error() {
        let mut config = BusinessConfig::default();
        config.star_configs.retain(|c| c.rating.value() != 3);
        let err = config
            .star_config(StarRating::try_from(3).unwrap())
            .unwrap_err();
        assert!(matches!(err, ReplywiseError::Config(_)));
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_star_config_is_configuration_error() {
        let mut config = BusinessConfig::default();
        let five = config.star_configs[4].clone();
        config.star_configs.push(five);
        assert!(config.validate().is_err());
    }

    #[test]
    fn language_mode_is_tagged() {
        let fixed = LanguageMode::Fixed {
            language: "German".into(),
        };
        let json = serde_json::to_string(&fixed).unwrap();
        assert_eq!(json, r#"{"mode":"fixed","language":"German"}"#);
        let auto: LanguageMode = serde_json::from_str(r#"{"mode":"match_reviewer"}"#).unwrap();
        assert_eq!(auto, LanguageMode::MatchReviewer);
    }

    #[test]
    fn quota_limit_sentinel() {
        assert_eq!(QuotaLimit::from_sentinel(-1).unwrap(), QuotaLimit::Unlimited);
        assert_eq!(QuotaLimit::from_sentinel(5).unwrap(), QuotaLimit::Monthly(5));
        assert!(QuotaLimit::from_sentinel(-2).is_err());
        assert_eq!(QuotaLimit::Monthly(7).to_sentinel(), 7);
    }

    #[test]
    fn review_text_ignores_blank_comments() {
        let review = Review {
            id: "r1".into(),
            business_id: "b1".into(),
            external_review_id: "ext-1".into(),
            reviewer_name: "Ana".into(),
            reviewer_photo_url: None,
            rating: StarRating::try_from(1).unwrap(),
            comment: Some("   ".into()),
            submitted_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
            is_anonymous: false,
            ingested_at: "2026-01-01T00:00:01.000Z".into(),
            reply_status: ReplyStatus::Pending,
            quota_exempt: false,
        };
        assert_eq!(review.text(), None);
    }

    #[test]
    fn business_display_name_prefers_override() {
        let mut business = Business {
            id: "b1".into(),
            user_id: "u1".into(),
            account_id: "a1".into(),
            name: "Cafe Uno".into(),
            location_name: "accounts/1/locations/2".into(),
            config: BusinessConfig::default(),
        };
        assert_eq!(business.display_name(), "Cafe Uno");
        business.config.display_name = Some("Uno Coffee".into());
        assert_eq!(business.display_name(), "Uno Coffee");
        assert_eq!(
            business.review_resource_name("abc"),
            "accounts/1/locations/2/reviews/abc"
        );
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken {
            token: "ya29.secret".into(),
            expires_in_secs: Some(3600),
        };
        assert!(!format!("{token:?}").contains("ya29"));
    }

    proptest::proptest! {
        #[test]
        fn star_rating_accepts_exactly_one_to_five(value in proptest::prelude::any::<u8>()) {
            let parsed = StarRating::try_from(value);
            proptest::prop_assert_eq!(parsed.is_ok(), (1..=5).contains(&value));
        }
    }
}
