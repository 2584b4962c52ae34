// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as numeric ranges, non-empty paths, and key encodings.

use crate::diagnostic::ConfigError;
use crate::model::ReplywiseConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ReplywiseConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let anthropic = &config.anthropic;
    if !(0.0..=1.0).contains(&anthropic.temperature) {
        fail(format!(
            "anthropic.temperature must be between 0 and 1, got {}",
            anthropic.temperature
        ));
    }
    if anthropic.max_tokens == 0 {
        fail("anthropic.max_tokens must be greater than 0".to_string());
    }

    for (key, value) in [
        ("anthropic.timeout_secs", anthropic.timeout_secs),
        ("platform.timeout_secs", config.platform.timeout_secs),
        (
            "pipeline.generation_timeout_secs",
            config.pipeline.generation_timeout_secs,
        ),
        (
            "pipeline.publish_timeout_secs",
            config.pipeline.publish_timeout_secs,
        ),
    ] {
        if value == 0 {
            fail(format!("{key} must be greater than 0"));
        }
    }

    if !(1..=50).contains(&config.platform.page_size) {
        fail(format!(
            "platform.page_size must be between 1 and 50, got {}",
            config.platform.page_size
        ));
    }

    if config.import.page_concurrency < 1 {
        fail("import.page_concurrency must be at least 1".to_string());
    }
    if config.import.max_in_flight_generations < 1 {
        fail("import.max_in_flight_generations must be at least 1".to_string());
    }

    if config.quota.default_monthly_limit < -1 {
        fail(format!(
            "quota.default_monthly_limit must be -1 (unlimited) or non-negative, got {}",
            config.quota.default_monthly_limit
        ));
    }

    if let Some(key) = &config.vault.token_key {
        let decoded = hex::decode(key.trim());
        if !matches!(decoded, Ok(ref bytes) if bytes.len() == 32) {
            fail("vault.token_key must be 64 hex characters (a 256-bit key)".to_string());
        }
    }

    if config.gateway.port == 0 {
        fail("gateway.port must not be 0".to_string());
    }
    if config.gateway.host.trim().is_empty() {
        fail("gateway.host must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = ReplywiseConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ReplywiseConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn temperature_out_of_range_fails_validation() {
        let mut config = ReplywiseConfig::default();
        config.anthropic.temperature = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "temperature"));
    }

    #[test]
    fn zero_timeouts_are_all_reported() {
        let mut config = ReplywiseConfig::default();
        config.pipeline.generation_timeout_secs = 0;
        config.pipeline.publish_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(has_error(&errors, "generation_timeout_secs"));
        assert!(has_error(&errors, "publish_timeout_secs"));
    }

    #[test]
    fn quota_below_unlimited_sentinel_fails() {
        let mut config = ReplywiseConfig::default();
        config.quota.default_monthly_limit = -1;
        assert!(validate_config(&config).is_ok());
        config.quota.default_monthly_limit = -2;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "default_monthly_limit"));
    }

    #[test]
    fn vault_key_must_be_256_bits_of_hex() {
        let mut config = ReplywiseConfig::default();
        config.vault.token_key = Some("abcd".to_string());
        assert!(has_error(&validate_config(&config).unwrap_err(), "token_key"));

        config.vault.token_key = Some("zz".repeat(32));
        assert!(has_error(&validate_config(&config).unwrap_err(), "token_key"));

        config.vault.token_key = Some("ab".repeat(32));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn page_size_and_concurrency_bounds() {
        let mut config = ReplywiseConfig::default();
        config.platform.page_size = 51;
        config.import.page_concurrency = 0;
        config.import.max_in_flight_generations = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "page_size"));
        assert!(has_error(&errors, "page_concurrency"));
        assert!(has_error(&errors, "max_in_flight_generations"));
    }
}
