// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Rapport engagement engine.
//!
//! This crate provides the trait definitions, error type and domain types
//! shared across the workspace. Storage backends and response generators
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RapportError;
pub use types::{
    AdapterType, ContentItem, ContentType, Conversation, ConversationFilter, HealthStatus, Level,
    Message, Model, ModelBio, ModelPreferences, ModelServices, ResponseContext, Role,
    StyleProfile, Subscriber, SubscriberFilter, SubscriberTier, Transaction, TransactionFilter,
    TransactionType, format_timestamp, new_id, now_timestamp, parse_timestamp,
};

pub use traits::{PluginAdapter, RandomSource, ResponseGenerator, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapport_error_has_all_variants() {
        let _config = RapportError::Config("test".into());
        let _storage = RapportError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _validation = RapportError::validation("name", "required");
        let _not_found = RapportError::not_found("model", "m-1");
        let _import = RapportError::Import {
            message: "test".into(),
            source: None,
        };
        let _generation = RapportError::Generation {
            message: "test".into(),
            source: None,
        };
        let _internal = RapportError::Internal("test".into());
    }

    #[test]
    fn adapter_type_parses_from_display() {
        use std::str::FromStr;
        for ty in [AdapterType::Storage, AdapterType::Generator] {
            assert_eq!(AdapterType::from_str(&ty.to_string()).unwrap(), ty);
        }
    }

    #[test]
    fn traits_are_object_safe() {
        fn _storage(_: &dyn StorageAdapter) {}
        fn _generator(_: &dyn ResponseGenerator) {}
        fn _random(_: &dyn RandomSource) {}
    }
}
