// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates constraints that serde attributes cannot express, such as
//! probability ranges, ordered thresholds and template placeholders.

use crate::diagnostic::ConfigError;
use crate::model::RapportConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &RapportConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.general.log_level.as_str()) {
        fail(format!(
            "general.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.general.log_level
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let upsell = &config.upsell;
    if upsell.min_messages < 1 {
        fail("upsell.min_messages must be at least 1".to_string());
    }
    if !(0.0..=1.0).contains(&upsell.approval_probability) {
        fail(format!(
            "upsell.approval_probability must be within [0, 1], got {}",
            upsell.approval_probability
        ));
    }
    if upsell.marker.trim().is_empty() {
        fail("upsell.marker must not be empty".to_string());
    } else if !upsell.offer_template.contains(&upsell.marker) {
        // Offers without the marker would never trigger the cooldown.
        fail(format!(
            "upsell.offer_template must contain the marker `{}`",
            upsell.marker
        ));
    }
    if !upsell.offer_template.contains("{title}") {
        fail("upsell.offer_template must contain `{title}`".to_string());
    }
    if upsell.recent_window_minutes <= 0 {
        fail(format!(
            "upsell.recent_window_minutes must be positive, got {}",
            upsell.recent_window_minutes
        ));
    }

    if config.matching.recent_messages < 1 {
        fail("matching.recent_messages must be at least 1".to_string());
    }

    let style = &config.style;
    for (name, medium, high) in [
        ("emoji", style.emoji_medium, style.emoji_high),
        ("flirt", style.flirt_medium, style.flirt_high),
        ("complexity", style.complexity_medium, style.complexity_high),
    ] {
        if medium < 0.0 || medium >= high {
            fail(format!(
                "style.{name}_medium must be non-negative and below style.{name}_high ({medium} >= {high})"
            ));
        }
    }

    if config.persona.deflection.trim().is_empty() {
        fail("persona.deflection must not be empty".to_string());
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
        assert!(validate_config(&RapportConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = RapportConfig::default();
        config.storage.database_path = " ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn probability_out_of_range_fails() {
        let mut config = RapportConfig::default();
        config.upsell.approval_probability = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "approval_probability"));
    }

    #[test]
    fn template_without_marker_fails() {
        let mut config = RapportConfig::default();
        config.upsell.offer_template = "Want to see {title} for ${price}?".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "marker"));
    }

    #[test]
    fn inverted_thresholds_fail() {
        let mut config = RapportConfig::default();
        config.style.flirt_medium = 0.9;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "style.flirt_medium"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = RapportConfig::default();
        config.general.log_level = "loud".to_string();
        config.upsell.min_messages = 0;
        config.persona.deflection = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_error(&errors, "log_level"));
        assert!(has_error(&errors, "min_messages"));
        assert!(has_error(&errors, "deflection"));
    }
}
