// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./replywise.toml` > `~/.config/replywise/replywise.toml` >
//! `/etc/replywise/replywise.toml` with environment variable overrides via `REPLYWISE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ReplywiseConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/replywise/replywise.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "replywise.toml";

/// Sections whose keys may be set through `REPLYWISE_<SECTION>_<KEY>`.
const ENV_SECTIONS: &[&str] = &[
    "service",
    "storage",
    "anthropic",
    "platform",
    "vault",
    "quota",
    "pipeline",
    "import",
    "gateway",
    "prometheus",
];

/// Per-user configuration file under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("replywise").join("replywise.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/replywise/replywise.toml`
/// 3. `~/.config/replywise/replywise.toml`
/// 4. `./replywise.toml`
/// 5. `REPLYWISE_*` environment variables
pub fn load_config() -> Result<ReplywiseConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of compiled defaults.
pub fn load_config_from_str(toml_content: &str) -> Result<ReplywiseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReplywiseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ReplywiseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReplywiseConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(ReplywiseConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider mapping `REPLYWISE_IMPORT_PAGE_CONCURRENCY` to
/// `import.page_concurrency`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that contain underscores survive intact.
fn env_provider() -> Env {
    Env::prefixed("REPLYWISE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a prefix-stripped env var name to a dotted config key.
pub fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    ENV_SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}"))
        })
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("anthropic_api_key"), "anthropic.api_key");
        assert_eq!(
            map_env_key("import_max_in_flight_generations"),
            "import.max_in_flight_generations"
        );
        assert_eq!(
            map_env_key("pipeline_notify_webhook_url"),
            "pipeline.notify_webhook_url"
        );
        assert_eq!(map_env_key("vault_token_key"), "vault.token_key");
    }

    #[test]
    fn unknown_env_section_is_left_alone() {
        assert_eq!(map_env_key("something_else"), "something_else");
    }
}
