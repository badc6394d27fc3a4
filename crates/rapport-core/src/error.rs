// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Rapport engagement engine.

use thiserror::Error;

/// The primary error type used across all Rapport adapter traits and core operations.
#[derive(Debug, Error)]
pub enum RapportError {
    /// Configuration errors (invalid values detected at runtime, missing sections).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An operator action was rejected before any state changed.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// A model, subscriber, content item or conversation does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Historical DM import failed (unreadable input, malformed CSV header).
    #[error("import error: {message}")]
    Import {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Response generation backend failed.
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RapportError {
    /// Shorthand for a [`RapportError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`RapportError::NotFound`] error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Returns true for [`RapportError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_field() {
        let err = RapportError::validation("price", "must be non-negative");
        assert_eq!(err.to_string(), "invalid price: must be non-negative");
    }

    #[test]
    fn not_found_is_detectable() {
        let err = RapportError::not_found("model", "m-1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "model not found: m-1");
        assert!(!RapportError::Internal("x".into()).is_not_found());
    }

    #[test]
    fn storage_wraps_string_sources() {
        let err = RapportError::storage("disk full");
        assert_eq!(err.to_string(), "storage error: disk full");
    }
}
