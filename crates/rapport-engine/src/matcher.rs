// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content matching against a model's vault.

use std::collections::BTreeSet;
use std::sync::Arc;

use rapport_core::{ContentItem, RapportError, StorageAdapter};
use tracing::debug;

/// Finds the vault item whose tags overlap the conversation keywords.
#[derive(Clone)]
pub struct ContentMatcher {
    storage: Arc<dyn StorageAdapter>,
}

impl ContentMatcher {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// First item in storage order sharing a tag with `keywords`.
    ///
    /// An empty keyword set returns `None` without a storage round-trip.
    pub async fn match_content(
        &self,
        model_id: &str,
        keywords: &BTreeSet<String>,
    ) -> Result<Option<ContentItem>, RapportError> {
        if keywords.is_empty() {
            return Ok(None);
        }
        let tags: Vec<String> = keywords.iter().cloned().collect();
        let matched = self
            .storage
            .find_content_by_tags(model_id, &tags)
            .await?
            .into_iter()
            .next();
        debug!(
            model_id,
            keywords = keywords.len(),
            matched = matched.as_ref().map(|c| c.id.as_str()),
            "content match"
        );
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapport_config::model::StorageConfig;
    use rapport_core::ContentType;
    use rapport_storage::{Database, SqliteStorage};

    async fn storage() -> Arc<dyn StorageAdapter> {
        let db = Database::open_in_memory().await.unwrap();
        Arc::new(SqliteStorage::from_database(StorageConfig::default(), db))
    }

    fn keywords(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_keywords_never_match() {
        let storage = storage().await;
        let mut item = ContentItem::new("m1", "Anything", "u", ContentType::Image, 1.0);
        item.tags = vec!["anything".into()];
        storage.insert_content(&item).await.unwrap();

        let matcher = ContentMatcher::new(storage);
        assert!(matcher.match_content("m1", &BTreeSet::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn returns_first_item_in_storage_order() {
        let storage = storage().await;
        let mut first = ContentItem::new("m1", "First", "u1", ContentType::Image, 5.0);
        first.tags = vec!["beach".into()];
        first.created_at = "2026-01-01T00:00:00.000Z".into();
        let mut second = ContentItem::new("m1", "Second", "u2", ContentType::Video, 15.0);
        second.tags = vec!["beach".into(), "sunset".into()];
        second.created_at = "2026-01-02T00:00:00.000Z".into();
        storage.insert_content(&second).await.unwrap();
        storage.insert_content(&first).await.unwrap();

        let matcher = ContentMatcher::new(storage);
        let found = matcher
            .match_content("m1", &keywords(&["sunset", "beach"]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn no_overlap_is_none() {
        let storage = storage().await;
        let mut item = ContentItem::new("m1", "Gym", "u", ContentType::Image, 1.0);
        item.tags = vec!["gym".into()];
        storage.insert_content(&item).await.unwrap();

        let matcher = ContentMatcher::new(storage);
        assert!(
            matcher
                .match_content("m1", &keywords(&["beach"]))
                .await
                .unwrap()
                .is_none()
        );
    }
}
