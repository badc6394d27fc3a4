// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Converts Figment deserialization errors into miette diagnostics. Keys from
//! a TOML file get source spans; keys from a `RAPPORT_*` variable are reported
//! under the variable's own name, with suggestions given as dotted keys.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::loader::{ENV_PREFIX, SECTIONS};

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// Catches `cooldwn_messages` -> `cooldown_messages` and `upsel` -> `upsell`.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(rapport::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key, or the full variable name for env overrides.
        key: String,
        /// Suggested correction via fuzzy matching, if any.
        suggestion: Option<String>,
        /// Valid keys for the section, comma separated.
        valid_keys: String,
        /// Source span for the offending key.
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        /// The source file content for context display.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(rapport::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// The dotted key path, or the variable name for env overrides.
        key: String,
        /// Description of the type mismatch.
        detail: String,
        /// What type was expected.
        expected: String,
        /// Source span for the offending value.
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        /// The source file content.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(rapport::config::missing_key),
        help("add `{key} = <value>` to your rapport.toml")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A semantic validation failure.
    #[error("validation error: {message}")]
    #[diagnostic(code(rapport::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(rapport::config::other))]
    Other(String),
}

/// Format the help message for unknown key errors.
fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// `toml_sources` pairs each loaded file path with its content so unknown
/// keys can be underlined in place.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut errors = Vec::new();

    for error in err {
        let from_env = is_env_sourced(&error);

        let config_error = match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid_keys: Vec<&str> = expected.to_vec();
                // Figment appends the offending key to the path.
                let mut section = error.path.clone();
                if section.last() == Some(field) {
                    section.pop();
                }
                if from_env {
                    env_unknown_key(&section, field, &valid_keys)
                } else {
                    let suggestion = suggest_key(field, &valid_keys);
                    let (span, src) = find_source_span(&error, &section, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion,
                        valid_keys: valid_keys.join(", "),
                        span,
                        src,
                    }
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.clone().into_owned(),
            },
            Kind::InvalidType(actual, expected) => {
                let key = if from_env {
                    env_var_name(&error.path)
                } else {
                    error.path.join(".")
                };
                ConfigError::InvalidType {
                    key,
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                    span: None,
                    src: None,
                }
            }
            _ => ConfigError::Other(format!("{error}")),
        };

        errors.push(config_error);
    }

    errors
}

/// Whether the failing value came from the `RAPPORT_` env provider.
///
/// Figment names a prefixed env provider "`<PREFIX>` environment variable(s)".
fn is_env_sourced(error: &figment::error::Error) -> bool {
    let tag = format!("`{ENV_PREFIX}`");
    error
        .metadata
        .as_ref()
        .is_some_and(|m| m.name.starts_with(tag.as_str()))
}

/// `["upsell", "min_messages"]` -> `RAPPORT_UPSELL_MIN_MESSAGES`.
pub fn env_var_name<S: AsRef<str>>(parts: &[S]) -> String {
    let joined: Vec<&str> = parts.iter().map(AsRef::as_ref).collect();
    format!("{ENV_PREFIX}{}", joined.join("_").to_ascii_uppercase())
}

/// Unknown key set through an env override.
///
/// Inside a section the field is matched against that section's keys. At the
/// top level the variable did not start with a known section, so the leading
/// segment is matched against the section names and the rest carried over.
/// Suggestions and valid keys are spelled as dotted paths.
fn env_unknown_key(path: &[String], field: &str, valid_keys: &[&str]) -> ConfigError {
    let mut parts: Vec<&str> = path.iter().map(String::as_str).collect();
    parts.push(field);
    let key = env_var_name(&parts);

    match path.first() {
        Some(section) => ConfigError::UnknownKey {
            key,
            suggestion: suggest_key(field, valid_keys).map(|k| format!("{section}.{k}")),
            valid_keys: valid_keys
                .iter()
                .map(|k| format!("{section}.{k}"))
                .collect::<Vec<_>>()
                .join(", "),
            span: None,
            src: None,
        },
        None => {
            let (head, rest) = field.split_once('_').unwrap_or((field, ""));
            let suggestion = suggest_key(head, &SECTIONS).map(|section| {
                if rest.is_empty() {
                    section
                } else {
                    format!("{section}.{rest}")
                }
            });
            ConfigError::UnknownKey {
                key,
                suggestion,
                valid_keys: SECTIONS
                    .iter()
                    .map(|s| format!("{s}.*"))
                    .collect::<Vec<_>>()
                    .join(", "),
                span: None,
                src: None,
            }
        }
    }
}

/// Locate the offending key in whichever TOML file produced the error.
fn find_source_span(
    error: &figment::error::Error,
    section: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let source_path = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let source = source_path.as_ref().and_then(|path| {
        toml_sources
            .iter()
            .find(|(p, _)| p == path)
            .map(|(p, content)| (p.as_str(), content.as_str()))
    });

    if let Some((path, content)) = source
        && let Some(offset) = find_key_offset(content, section, field)
    {
        let span = SourceSpan::new(offset.into(), field.len());
        let named = NamedSource::new(path, content.to_string());
        return (Some(span), Some(named));
    }

    (None, None)
}

/// Find the byte offset of a key in TOML content, relative to a section path.
///
/// For `path = ["upsell"]` and `field = "min_mesages"`, finds the `[upsell]`
/// header then searches for the key after it.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let search_start = match path.first() {
        None => 0,
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header).map(|pos| pos + header.len())?
        }
    };

    let mut byte_offset = 0;
    for line in content[search_start..].lines() {
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(field)
            && (after.starts_with(' ') || after.starts_with('=') || after.starts_with('\t'))
        {
            return Some(search_start + byte_offset + (line.len() - trimmed.len()));
        }
        byte_offset += line.len() + 1;
    }

    None
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
