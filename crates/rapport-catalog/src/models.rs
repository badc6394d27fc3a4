// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model personas: creation, bio and services, no-go topics, DM import.

use std::sync::Arc;

use rapport_core::{
    Message, Model, ModelBio, ModelServices, RapportError, Role, StorageAdapter, StyleProfile,
    now_timestamp,
};
use rapport_engine::StyleAnalyzer;
use rapport_import::ImportFormat;
use serde::Serialize;
use tracing::info;

use crate::required;

/// Outcome of importing historical DMs for a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    /// Records parsed from the input.
    pub records: usize,
    /// Records authored by the model, the ones the profile is learned from.
    pub assistant_messages: usize,
    pub profile: StyleProfile,
}

#[derive(Clone)]
pub struct ModelCatalog {
    storage: Arc<dyn StorageAdapter>,
    analyzer: StyleAnalyzer,
}

impl ModelCatalog {
    pub fn new(storage: Arc<dyn StorageAdapter>, analyzer: StyleAnalyzer) -> Self {
        Self { storage, analyzer }
    }

    pub async fn create(&self, name: &str) -> Result<Model, RapportError> {
        let model = Model::new(required("name", name)?);
        self.storage.insert_model(&model).await?;
        info!(model_id = %model.id, name = %model.name, "model created");
        Ok(model)
    }

    pub async fn list(&self) -> Result<Vec<Model>, RapportError> {
        self.storage.list_models().await
    }

    pub async fn get(&self, id: &str) -> Result<Model, RapportError> {
        self.storage
            .get_model(id)
            .await?
            .ok_or_else(|| RapportError::not_found("model", id))
    }

    async fn save(&self, mut model: Model) -> Result<Model, RapportError> {
        model.updated_at = now_timestamp();
        self.storage.update_model(&model).await?;
        Ok(model)
    }

    pub async fn update_bio(&self, id: &str, bio: ModelBio) -> Result<Model, RapportError> {
        let mut model = self.get(id).await?;
        model.bio = bio;
        self.save(model).await
    }

    pub async fn update_services(
        &self,
        id: &str,
        services: ModelServices,
    ) -> Result<Model, RapportError> {
        for (field, price) in [
            ("ppv_base_price", services.ppv_base_price),
            ("subscription_price", services.subscription_price),
        ] {
            if let Some(p) = price
                && (!p.is_finite() || p < 0.0)
            {
                return Err(RapportError::validation(
                    field,
                    format!("must be a finite, non-negative number, got {p}"),
                ));
            }
        }
        let mut model = self.get(id).await?;
        model.services = services;
        self.save(model).await
    }

    /// Add a no-go topic. Adding a topic already present in any case is a no-op.
    pub async fn add_no_go_topic(&self, id: &str, topic: &str) -> Result<Model, RapportError> {
        let topic = required("topic", topic)?;
        let mut model = self.get(id).await?;
        let lower = topic.to_lowercase();
        if model.no_go_topics.iter().any(|t| t.to_lowercase() == lower) {
            return Ok(model);
        }
        model.no_go_topics.push(topic);
        self.save(model).await
    }

    /// Remove a no-go topic, matched case-insensitively.
    pub async fn remove_no_go_topic(&self, id: &str, topic: &str) -> Result<Model, RapportError> {
        let lower = topic.trim().to_lowercase();
        let mut model = self.get(id).await?;
        let before = model.no_go_topics.len();
        model.no_go_topics.retain(|t| t.to_lowercase() != lower);
        if model.no_go_topics.len() == before {
            return Ok(model);
        }
        self.save(model).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, RapportError> {
        self.storage.delete_model(id).await
    }

    /// Learn the model's style from historical DMs and store it in its preferences.
    pub async fn import_history(
        &self,
        id: &str,
        records: &[Message],
    ) -> Result<ImportReport, RapportError> {
        let mut model = self.get(id).await?;
        let assistant_messages = records.iter().filter(|m| m.role == Role::Assistant).count();

        let mut profile = self.analyzer.analyze(records);
        profile.last_updated = Some(now_timestamp());
        model.preferences.style = Some(profile.clone());
        self.save(model).await?;

        info!(
            model_id = id,
            records = records.len(),
            assistant_messages,
            emoji = %profile.emoji_frequency,
            flirt = %profile.flirt_level,
            complexity = %profile.message_complexity,
            "dm history imported"
        );
        Ok(ImportReport {
            records: records.len(),
            assistant_messages,
            profile,
        })
    }

    /// Parse `input` in `format` and import the resulting records.
    pub async fn import_text(
        &self,
        id: &str,
        format: ImportFormat,
        input: &str,
    ) -> Result<ImportReport, RapportError> {
        let records = rapport_import::parse(format, input)?;
        self.import_history(id, &records).await
    }
}
