// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Replywise configuration system.

use replywise_config::diagnostic::ConfigError;
use replywise_config::model::ReplywiseConfig;
use replywise_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[service]
name = "replywise-test"
log_level = "debug"

[storage]
database_path = "/tmp/replywise.db"
wal_mode = false

[anthropic]
api_key = "sk-ant-123"
model = "claude-haiku-4-5"
temperature = 0.3
max_tokens = 400

[platform]
api_base_url = "http://localhost:9000"
token_url = "http://localhost:9000/token"
client_id = "cid"
client_secret = "csecret"
page_size = 20

[quota]
default_monthly_limit = -1

[pipeline]
generation_timeout_secs = 15
notify_webhook_url = "http://localhost:9100/hook"

[import]
page_concurrency = 2
max_in_flight_generations = 1
generate_missing_replies = false
history_quota_exempt = false

[gateway]
port = 8081
bearer_token = "secret"

[prometheus]
enabled = false
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "replywise-test");
    assert_eq!(config.storage.database_path, "/tmp/replywise.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.anthropic.model, "claude-haiku-4-5");
    assert_eq!(config.anthropic.max_tokens, 400);
    assert_eq!(config.platform.page_size, 20);
    assert_eq!(config.platform.client_secret.as_deref(), Some("csecret"));
    assert_eq!(config.quota.default_monthly_limit, -1);
    assert_eq!(config.pipeline.generation_timeout_secs, 15);
    assert_eq!(config.pipeline.publish_timeout_secs, 30);
    assert_eq!(config.import.page_concurrency, 2);
    assert!(!config.import.generate_missing_replies);
    assert!(!config.import.history_quota_exempt);
    assert_eq!(config.gateway.port, 8081);
    assert!(!config.prometheus.enabled);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.service.name, "replywise");
    assert_eq!(config.anthropic.model, "claude-sonnet-4-20250514");
    assert_eq!(config.anthropic.api_version, "2023-06-01");
    assert!(config.anthropic.api_key.is_none());
    assert_eq!(config.platform.page_size, 50);
    assert_eq!(config.quota.default_monthly_limit, 50);
    assert_eq!(config.import.max_in_flight_generations, 4);
    assert!(config.import.generate_missing_replies);
    assert!(config.import.history_quota_exempt);
    assert!(config.gateway.bearer_token.is_none());
    assert!(config.vault.token_key.is_none());
}

#[test]
fn unknown_field_is_rejected_with_suggestion() {
    let toml = r#"
[anthropic]
modle = "claude"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("expected an unknown-key diagnostic");
    assert_eq!(unknown.0, "modle");
    assert_eq!(unknown.1.as_deref(), Some("model"));
}

#[test]
fn unknown_section_is_rejected() {
    let err = load_config_from_str("[telegram]\nbot_token = \"x\"\n");
    assert!(err.is_err());
}

#[test]
fn invalid_type_produces_diagnostic() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_)))
    );
}

#[test]
fn validation_runs_after_parse() {
    let errors = load_and_validate_str("[anthropic]\ntemperature = 2.0\n").unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("temperature"))
    ));
}

#[test]
fn dotted_override_sets_nested_key() {
    use figment::{Figment, providers::Serialized};

    // Same shape the REPLYWISE_IMPORT_PAGE_CONCURRENCY env var produces.
    let config: ReplywiseConfig = Figment::new()
        .merge(Serialized::defaults(ReplywiseConfig::default()))
        .merge(("import.page_concurrency", 3))
        .merge(("anthropic.api_key", "from-env"))
        .extract()
        .expect("should merge dotted override");

    assert_eq!(config.import.page_concurrency, 3);
    assert_eq!(config.anthropic.api_key.as_deref(), Some("from-env"));
}

#[test]
fn missing_config_file_is_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: ReplywiseConfig = Figment::new()
        .merge(Serialized::defaults(ReplywiseConfig::default()))
        .merge(Toml::file("/nonexistent/path/replywise.toml"))
        .extract()
        .expect("missing file should be silently skipped");
    assert_eq!(config.service.name, "replywise");
}

#[test]
fn unknown_key_in_file_carries_source_span() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("replywise.toml");
    std::fs::write(&path, "[import]\npage_concurency = 2\n").unwrap();

    let errors = load_and_validate_path(&path).unwrap_err();
    let has_span = errors
        .iter()
        .any(|e| matches!(e, ConfigError::UnknownKey { span: Some(_), .. }));
    assert!(has_span, "expected a located diagnostic, got {errors:?}");
}

#[test]
fn diagnostics_render_through_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let errors = load_and_validate_str("[gateway]\nprot = 1\n").unwrap_err();
    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &errors[0] as &dyn Diagnostic)
        .unwrap();
    assert!(buf.contains("prot"));
    assert!(buf.contains("port"));
}
