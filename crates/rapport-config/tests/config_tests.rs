// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Rapport configuration system.

use rapport_config::diagnostic::ConfigError;
use rapport_config::model::RapportConfig;
use rapport_config::{
    load_and_validate, load_and_validate_path, load_and_validate_str, load_config_from_str,
};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_rapport_config() {
    let toml = r#"
[general]
name = "studio-a"
log_level = "debug"

[storage]
database_path = "/tmp/rapport-test.db"
wal_mode = false

[upsell]
min_messages = 6
max_negative = 0
max_hesitant = 1
cooldown_messages = 10
approval_probability = 0.5
marker = "[offer]"
offer_template = "[offer] {title} for {price}"
recent_window_minutes = 30

[matching]
recent_messages = 5
min_keyword_chars = 5

[style]
emoji_medium = 0.2
emoji_high = 0.6

[persona]
deflection = "Let's talk about something else"
seed = 7
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.general.name, "studio-a");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/rapport-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.upsell.min_messages, 6);
    assert_eq!(config.upsell.max_negative, 0);
    assert_eq!(config.upsell.cooldown_messages, 10);
    assert_eq!(config.upsell.marker, "[offer]");
    assert_eq!(config.upsell.recent_window_minutes, 30);
    assert_eq!(config.matching.recent_messages, 5);
    assert!((config.style.emoji_high - 0.6).abs() < f64::EPSILON);
    // Unset keys in a present section keep their defaults.
    assert!((config.style.flirt_high - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.persona.seed, Some(7));
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").unwrap();
    let defaults = RapportConfig::default();
    assert_eq!(config.upsell.min_messages, defaults.upsell.min_messages);
    assert_eq!(config.persona.deflection, defaults.persona.deflection);
    assert_eq!(config.storage.database_path, defaults.storage.database_path);
}

#[test]
fn unknown_field_in_upsell_produces_error() {
    let toml = r#"
[upsell]
cooldwn_messages = 3
"#;
    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("cooldwn_messages"),
        "error should mention the bad key, got: {err_str}"
    );
}

#[test]
fn unknown_section_produces_error() {
    assert!(load_config_from_str("[telemetry]\nenabled = true\n").is_err());
}

#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let errors = load_and_validate_str("[upsell]\ncooldwn_messages = 3\n").unwrap_err();
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("cooldown_messages"));
}

#[test]
fn wrong_type_is_reported_as_invalid_type() {
    let errors = load_and_validate_str("[upsell]\nmin_messages = \"four\"\n").unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::InvalidType { key, .. } if key.contains("min_messages")
    )));
}

#[test]
fn validation_runs_after_successful_parse() {
    let errors = load_and_validate_str("[upsell]\napproval_probability = -0.1\n").unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { message } if message.contains("approval_probability")
    )));
}

#[test]
fn load_from_path_reads_file() {
    let dir = std::env::temp_dir().join(format!("rapport-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("rapport.toml");
    std::fs::write(&path, "[matching]\nrecent_messages = 4\n").unwrap();

    let config = load_and_validate_path(&path).unwrap();
    assert_eq!(config.matching.recent_messages, 4);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn env_overrides_apply_through_load_and_validate() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("rapport.toml", "[upsell]\nmin_messages = 6\n")?;
        jail.set_env("RAPPORT_PERSONA_SEED", "7");
        jail.set_env("RAPPORT_UPSELL_MIN_MESSAGES", "5");
        jail.set_env("RAPPORT_GENERAL_LOG_LEVEL", "debug");

        let config = load_and_validate().map_err(|errors| format!("{errors:?}"))?;
        assert_eq!(config.persona.seed, Some(7));
        assert_eq!(config.upsell.min_messages, 5);
        assert_eq!(config.general.log_level, "debug");
        Ok(())
    });
}

#[test]
fn misspelled_env_override_names_the_variable() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("RAPPORT_UPSELL_MIN_MESAGES", "5");

        let errors = load_and_validate().expect_err("typo should be rejected");
        let (key, suggestion) = errors
            .iter()
            .find_map(|e| match e {
                ConfigError::UnknownKey {
                    key, suggestion, ..
                } => Some((key.clone(), suggestion.clone())),
                _ => None,
            })
            .expect("an unknown key diagnostic");
        assert_eq!(key, "RAPPORT_UPSELL_MIN_MESAGES");
        assert_eq!(suggestion.as_deref(), Some("upsell.min_messages"));
        Ok(())
    });
}
