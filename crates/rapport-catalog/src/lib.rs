// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator operations over the Rapport catalog.
//!
//! Every operation validates its input before touching storage, so a
//! rejected call leaves no trace. Validation failures surface as
//! [`RapportError::Validation`].

pub mod content;
pub mod models;
pub mod subscribers;

use std::sync::Arc;

use rapport_config::model::RapportConfig;
use rapport_core::{RapportError, StorageAdapter};
use rapport_engine::StyleAnalyzer;
use rapport_revenue::Ledger;

pub use content::{ContentCatalog, NewContent};
pub use models::{ImportReport, ModelCatalog};
pub use subscribers::{SubscriberCatalog, TipReceipt};

/// The three operator catalogs over one storage backend.
#[derive(Clone)]
pub struct Catalog {
    pub models: ModelCatalog,
    pub subscribers: SubscriberCatalog,
    pub content: ContentCatalog,
}

impl Catalog {
    pub fn new(storage: Arc<dyn StorageAdapter>, config: &RapportConfig) -> Self {
        let ledger = Ledger::new(storage.clone());
        Self {
            models: ModelCatalog::new(storage.clone(), StyleAnalyzer::new(config.style.clone())),
            subscribers: SubscriberCatalog::new(storage.clone(), ledger.clone()),
            content: ContentCatalog::new(storage, ledger),
        }
    }
}

/// Trimmed `value`, or a validation error naming `field` when blank.
pub(crate) fn required(field: &str, value: &str) -> Result<String, RapportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RapportError::validation(field, "is required"));
    }
    Ok(trimmed.to_string())
}
