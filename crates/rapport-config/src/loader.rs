// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./rapport.toml` > `~/.config/rapport/rapport.toml` > `/etc/rapport/rapport.toml`
//! with environment variable overrides via `RAPPORT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RapportConfig;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "RAPPORT_";

/// Top-level config sections, in declaration order.
pub(crate) const SECTIONS: [&str; 6] = [
    "general", "storage", "upsell", "matching", "style", "persona",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/rapport/rapport.toml` (system-wide)
/// 3. `~/.config/rapport/rapport.toml` (user XDG config)
/// 4. `./rapport.toml` (local directory)
/// 5. `RAPPORT_*` environment variables
pub fn load_config() -> Result<RapportConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RapportConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RapportConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RapportConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RapportConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RapportConfig::default()))
        .merge(Toml::file("/etc/rapport/rapport.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("rapport/rapport.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("rapport.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// keys survive: `RAPPORT_UPSELL_MIN_MESSAGES` maps to `upsell.min_messages`.
/// Figment hands the mapper the prefix-stripped name in its original case.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
