// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembles template variables from a business's configuration and a review.

use replywise_core::error::ReplywiseError;
use replywise_core::types::{BusinessConfig, LanguageMode, Review, Tone};
use tracing::debug;

use crate::template::{Template, TemplateVars};

/// Template used when a business has no prompt template override.
pub const DEFAULT_TEMPLATE: &str = "\
You are replying on behalf of {{BUSINESS_NAME}} to a customer review.
{{#BUSINESS_DESCRIPTION}}About the business: {{BUSINESS_DESCRIPTION}}
{{/BUSINESS_DESCRIPTION}}
Review details:
- Rating: {{RATING}} out of 5 stars
{{#REVIEWER_NAME}}- Reviewer: {{REVIEWER_NAME}}
{{/REVIEWER_NAME}}{{#REVIEW_TEXT}}- Review: \"{{REVIEW_TEXT}}\"
{{/REVIEW_TEXT}}{{^REVIEW_TEXT}}- The reviewer left a rating without any text.
{{/REVIEW_TEXT}}
Write a reply in a {{TONE_DESCRIPTION}} tone.
{{#CUSTOM_INSTRUCTIONS}}Follow these instructions from the owner: {{CUSTOM_INSTRUCTIONS}}
{{/CUSTOM_INSTRUCTIONS}}{{^CUSTOM_INSTRUCTIONS}}{{#IS_NEGATIVE}}Acknowledge the problem, apologize sincerely and invite the reviewer to get in touch.
{{/IS_NEGATIVE}}{{#IS_NEUTRAL}}Thank the reviewer and mention that you are always working to improve.
{{/IS_NEUTRAL}}{{#IS_POSITIVE}}Thank the reviewer warmly for the kind words.
{{/IS_POSITIVE}}{{/CUSTOM_INSTRUCTIONS}}{{#IS_NEGATIVE}}{{#CONTACT_PHONE}}Offer the phone number {{CONTACT_PHONE}} so they can reach the team directly.
{{/CONTACT_PHONE}}{{/IS_NEGATIVE}}{{#TARGET_LANGUAGE}}Write the reply in {{TARGET_LANGUAGE}}.
{{/TARGET_LANGUAGE}}{{#IS_AUTO_DETECT}}Write the reply in the same language as the review.
{{/IS_AUTO_DETECT}}{{#EMOJI_INSTRUCTIONS}}{{EMOJI_INSTRUCTIONS}}
{{/EMOJI_INSTRUCTIONS}}{{^EMOJI_INSTRUCTIONS}}Do not use emojis.
{{/EMOJI_INSTRUCTIONS}}{{#MAX_SENTENCES}}Keep the reply to at most {{MAX_SENTENCES}} sentences.
{{/MAX_SENTENCES}}{{#SIGNATURE}}End the reply with the signature: {{SIGNATURE}}
{{/SIGNATURE}}
Respond with the reply text only, without quotes or commentary.
";

/// Builds the variable bag and the final prompt for one review.
///
/// The default template is supplied at construction so callers and tests
/// choose it explicitly. A business's own `prompt_template` always wins.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    default_template: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl PromptBuilder {
    pub fn new(default_template: impl Into<String>) -> Self {
        Self {
            default_template: default_template.into(),
        }
    }

    pub fn default_template(&self) -> &str {
        &self.default_template
    }

    /// Assembles the variables for `review` under `config`.
    ///
    /// Fails with [`ReplywiseError::Config`] when the review's rating has no
    /// StarConfig. Neither input is modified.
    pub fn build(
        &self,
        config: &BusinessConfig,
        review: &Review,
        business_display_name: &str,
        phone: Option<&str>,
    ) -> Result<TemplateVars, ReplywiseError> {
        let star = config.star_config(review.rating)?;
        let rating = review.rating.value();
        let mut vars = TemplateVars::new();

        vars.set("BUSINESS_NAME", business_display_name)
            .set("RATING", rating.to_string())
            .set("CUSTOM_INSTRUCTIONS", star.custom_instructions.trim())
            .set("TONE", config.tone.to_string())
            .set("TONE_DESCRIPTION", tone_description(config.tone))
            .set_opt("BUSINESS_DESCRIPTION", non_blank(config.description.as_deref()))
            .set_opt("REVIEW_TEXT", review.text())
            .set_opt("CONTACT_PHONE", non_blank(phone))
            .set_opt("SIGNATURE", non_blank(config.signature.as_deref()))
            .set_opt(
                "MAX_SENTENCES",
                config.max_sentences.filter(|n| *n > 0).map(|n| n.to_string()),
            )
            .set_flag("IS_NEGATIVE", review.rating.is_negative())
            .set_flag("IS_NEUTRAL", rating == 3)
            .set_flag("IS_POSITIVE", rating >= 4);

        if !review.is_anonymous {
            vars.set_opt("REVIEWER_NAME", non_blank(Some(review.reviewer_name.as_str())));
        }

        match &config.language {
            LanguageMode::Fixed { language } if !language.trim().is_empty() => {
                vars.set("TARGET_LANGUAGE", language.trim());
            }
            LanguageMode::Fixed { .. } | LanguageMode::AutoDetect => {
                vars.set_flag("IS_AUTO_DETECT", true);
            }
            LanguageMode::MatchReviewer => {
                vars.set_flag("IS_AUTO_DETECT", true)
                    .set_flag("MATCH_REVIEWER", true);
            }
        }

        if config.use_emojis && !config.allowed_emojis.is_empty() {
            vars.set(
                "EMOJI_INSTRUCTIONS",
                format!(
                    "You may use a few emojis, chosen only from: {}",
                    config.allowed_emojis.join(" ")
                ),
            );
        }

        debug!(
            review_id = review.id.as_str(),
            rating,
            variables = vars.len(),
            "prompt variables assembled"
        );
        Ok(vars)
    }

    /// Template that applies to `config`: its override, else the default.
    pub fn template_for<'a>(&'a self, config: &'a BusinessConfig) -> &'a str {
        config
            .prompt_template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.default_template)
    }

    /// Builds the variables and renders the applicable template.
    pub fn build_prompt(
        &self,
        config: &BusinessConfig,
        review: &Review,
        business_display_name: &str,
        phone: Option<&str>,
    ) -> Result<String, ReplywiseError> {
        let vars = self.build(config, review, business_display_name, phone)?;
        Ok(Template::parse(self.template_for(config)).render(&vars))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn tone_description(tone: Tone) -> &'static str {
    match tone {
        Tone::Professional => "professional and courteous",
        Tone::Friendly => "warm and friendly",
        Tone::Casual => "relaxed and casual",
        Tone::Formal => "formal and respectful",
        Tone::Enthusiastic => "upbeat and enthusiastic",
    }
}
