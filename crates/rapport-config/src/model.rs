// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Rapport engagement engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Rapport configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to the tuned production values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RapportConfig {
    /// Instance name and logging.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Upsell gate thresholds and offer rendering.
    #[serde(default)]
    pub upsell: UpsellConfig,

    /// Keyword extraction for content matching.
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Style profile classification thresholds.
    #[serde(default)]
    pub style: StyleConfig,

    /// Persona reply settings.
    #[serde(default)]
    pub persona: PersonaConfig,
}

/// Instance identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Display name of this instance.
    #[serde(default = "default_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_name() -> String {
    "rapport".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("rapport").join("rapport.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("rapport.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Upsell gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpsellConfig {
    /// Minimum conversation length before any offer.
    #[serde(default = "default_min_messages")]
    pub min_messages: usize,

    /// Highest tolerated negative score on the triggering message.
    #[serde(default = "default_max_negative")]
    pub max_negative: u32,

    /// Highest tolerated hesitant score on the triggering message.
    #[serde(default = "default_max_hesitant")]
    pub max_hesitant: u32,

    /// Cooldown window after an offer, counting the offer message itself.
    #[serde(default = "default_cooldown_messages")]
    pub cooldown_messages: usize,

    /// Probability of approving once every deterministic gate passes.
    #[serde(default = "default_approval_probability")]
    pub approval_probability: f64,

    /// Substring identifying an assistant message as an offer.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Offer text. `{title}` and `{price}` are substituted.
    #[serde(default = "default_offer_template")]
    pub offer_template: String,

    /// Window the last three messages must fall within for a proactive offer.
    #[serde(default = "default_recent_window_minutes")]
    pub recent_window_minutes: i64,
}

impl Default for UpsellConfig {
    fn default() -> Self {
        Self {
            min_messages: default_min_messages(),
            max_negative: default_max_negative(),
            max_hesitant: default_max_hesitant(),
            cooldown_messages: default_cooldown_messages(),
            approval_probability: default_approval_probability(),
            marker: default_marker(),
            offer_template: default_offer_template(),
            recent_window_minutes: default_recent_window_minutes(),
        }
    }
}

fn default_min_messages() -> usize {
    4
}

fn default_max_negative() -> u32 {
    1
}

fn default_max_hesitant() -> u32 {
    2
}

fn default_cooldown_messages() -> usize {
    8
}

fn default_approval_probability() -> f64 {
    0.3
}

fn default_marker() -> String {
    "PPV".to_string()
}

fn default_offer_template() -> String {
    "I made something just for you 😘 \"{title}\" is waiting in your DMs for ${price}. Unlock this PPV?"
        .to_string()
}

fn default_recent_window_minutes() -> i64 {
    60
}

/// Keyword extraction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    /// How many trailing messages feed keyword extraction.
    #[serde(default = "default_recent_messages")]
    pub recent_messages: usize,

    /// Minimum token length in characters.
    #[serde(default = "default_min_keyword_chars")]
    pub min_keyword_chars: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            recent_messages: default_recent_messages(),
            min_keyword_chars: default_min_keyword_chars(),
        }
    }
}

fn default_recent_messages() -> usize {
    3
}

fn default_min_keyword_chars() -> usize {
    4
}

/// Style classification thresholds. Ratios strictly above a threshold reach that level.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    #[serde(default = "default_emoji_medium")]
    pub emoji_medium: f64,
    #[serde(default = "default_emoji_high")]
    pub emoji_high: f64,
    #[serde(default = "default_flirt_medium")]
    pub flirt_medium: f64,
    #[serde(default = "default_flirt_high")]
    pub flirt_high: f64,
    /// Average words per message.
    #[serde(default = "default_complexity_medium")]
    pub complexity_medium: f64,
    #[serde(default = "default_complexity_high")]
    pub complexity_high: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            emoji_medium: default_emoji_medium(),
            emoji_high: default_emoji_high(),
            flirt_medium: default_flirt_medium(),
            flirt_high: default_flirt_high(),
            complexity_medium: default_complexity_medium(),
            complexity_high: default_complexity_high(),
        }
    }
}

fn default_emoji_medium() -> f64 {
    0.1
}

fn default_emoji_high() -> f64 {
    0.5
}

fn default_flirt_medium() -> f64 {
    0.2
}

fn default_flirt_high() -> f64 {
    0.5
}

fn default_complexity_medium() -> f64 {
    8.0
}

fn default_complexity_high() -> f64 {
    15.0
}

/// Persona reply configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonaConfig {
    /// Reply used when the subscriber raises a no-go topic.
    #[serde(default = "default_deflection")]
    pub deflection: String,

    /// Seed for a deterministic random source. Unset uses thread randomness.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            deflection: default_deflection(),
            seed: None,
        }
    }
}

fn default_deflection() -> String {
    "I'd prefer not to talk about that. Tell me about your day instead?".to_string()
}
