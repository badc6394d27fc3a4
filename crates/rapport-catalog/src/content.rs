// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PPV content vault per model.

use std::sync::Arc;

use rapport_core::{ContentItem, ContentType, RapportError, StorageAdapter, Transaction};
use rapport_revenue::Ledger;
use tracing::info;

use crate::required;

/// Operator input for a new vault item.
#[derive(Debug, Clone)]
pub struct NewContent {
    pub title: String,
    pub description: Option<String>,
    pub content_url: String,
    pub content_type: ContentType,
    pub tags: Vec<String>,
    pub price: f64,
}

fn validate_price(price: f64) -> Result<(), RapportError> {
    if !price.is_finite() || price < 0.0 {
        return Err(RapportError::validation(
            "price",
            format!("must be a finite, non-negative number, got {price}"),
        ));
    }
    Ok(())
}

fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct ContentCatalog {
    storage: Arc<dyn StorageAdapter>,
    ledger: Ledger,
}

impl ContentCatalog {
    pub fn new(storage: Arc<dyn StorageAdapter>, ledger: Ledger) -> Self {
        Self { storage, ledger }
    }

    pub async fn add(&self, model_id: &str, input: NewContent) -> Result<ContentItem, RapportError> {
        let title = required("title", &input.title)?;
        let url = required("content_url", &input.content_url)?;
        validate_price(input.price)?;
        if self.storage.get_model(model_id).await?.is_none() {
            return Err(RapportError::not_found("model", model_id));
        }

        let mut item = ContentItem::new(model_id, title, url, input.content_type, input.price);
        item.description = input.description.filter(|d| !d.trim().is_empty());
        item.tags = clean_tags(&input.tags);
        self.storage.insert_content(&item).await?;
        info!(content_id = %item.id, model_id, price = item.price, "content added");
        Ok(item)
    }

    pub async fn list(&self, model_id: &str) -> Result<Vec<ContentItem>, RapportError> {
        self.storage.list_content(model_id).await
    }

    pub async fn get(&self, id: &str) -> Result<ContentItem, RapportError> {
        self.storage
            .get_content(id)
            .await?
            .ok_or_else(|| RapportError::not_found("content", id))
    }

    /// Replace an item's mutable fields after the same checks as [`Self::add`].
    pub async fn update(&self, item: &ContentItem) -> Result<ContentItem, RapportError> {
        let mut item = item.clone();
        item.title = required("title", &item.title)?;
        item.content_url = required("content_url", &item.content_url)?;
        validate_price(item.price)?;
        item.tags = clean_tags(&item.tags);
        self.storage.update_content(&item).await?;
        Ok(item)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, RapportError> {
        self.storage.delete_content(id).await
    }

    /// Items of `model_id` tagged with any of `keywords`, case-insensitively.
    pub async fn find_by_keywords(
        &self,
        model_id: &str,
        keywords: &[String],
    ) -> Result<Vec<ContentItem>, RapportError> {
        let keywords = clean_tags(keywords);
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        self.storage.find_content_by_tags(model_id, &keywords).await
    }

    /// Send an item to a subscriber as a PPV offer.
    pub async fn send_ppv(
        &self,
        subscriber_id: &str,
        content_id: &str,
    ) -> Result<Transaction, RapportError> {
        let item = self.get(content_id).await?;
        if self.storage.get_subscriber(subscriber_id).await?.is_none() {
            return Err(RapportError::not_found("subscriber", subscriber_id));
        }
        self.ledger.record_offer(subscriber_id, &item).await
    }
}
