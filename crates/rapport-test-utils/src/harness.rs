// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete engine stack (storage, ledger,
//! catalog, conversation engine) over a temp SQLite database or in-memory
//! storage, with scripted randomness so every upsell branch is reachable.

use std::sync::Arc;

use rapport_catalog::Catalog;
use rapport_config::model::{RapportConfig, StorageConfig};
use rapport_core::{
    Conversation, Message, Model, RapportError, ResponseGenerator, StorageAdapter, Subscriber,
    SubscriberTier,
};
use rapport_engine::{ConversationEngine, TurnOutcome};
use rapport_revenue::Ledger;
use rapport_storage::SqliteStorage;

use crate::memory_storage::MemoryStorage;
use crate::mock_generator::MockGenerator;
use crate::scripted_random::ScriptedRandom;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    draws: Vec<f64>,
    fallback: f64,
    replies: Option<Vec<String>>,
    config: RapportConfig,
    in_memory: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            draws: Vec::new(),
            fallback: 0.0,
            replies: None,
            config: RapportConfig::default(),
            in_memory: false,
        }
    }

    /// Scripted random draws, consumed in order.
    pub fn with_draws(mut self, draws: Vec<f64>) -> Self {
        self.draws = draws;
        self
    }

    /// Draw returned once the script is exhausted (default 0.0).
    pub fn with_fallback_draw(mut self, value: f64) -> Self {
        self.fallback = value;
        self
    }

    /// Replace the persona responder with a [`MockGenerator`].
    pub fn with_mock_replies(mut self, replies: Vec<String>) -> Self {
        self.replies = Some(replies);
        self
    }

    pub fn with_config(mut self, config: RapportConfig) -> Self {
        self.config = config;
        self
    }

    /// Use [`MemoryStorage`] instead of a temp SQLite database.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, RapportError> {
        let mut config = self.config;
        let (storage, temp_dir) = if self.in_memory {
            let storage: Arc<dyn StorageAdapter> = Arc::new(MemoryStorage::new());
            (storage, None)
        } else {
            let temp_dir = tempfile::TempDir::new().map_err(RapportError::storage)?;
            config.storage = StorageConfig {
                database_path: temp_dir.path().join("test.db").to_string_lossy().to_string(),
                wal_mode: true,
            };
            let storage = SqliteStorage::new(config.storage.clone());
            storage.initialize().await?;
            let storage: Arc<dyn StorageAdapter> = Arc::new(storage);
            (storage, Some(temp_dir))
        };

        let rng = Arc::new(ScriptedRandom::with_fallback(self.draws, self.fallback));
        let generator = self.replies.map(|r| Arc::new(MockGenerator::with_replies(r)));
        let engine = match &generator {
            Some(generator) => ConversationEngine::with_generator(
                storage.clone(),
                rng.clone(),
                generator.clone() as Arc<dyn ResponseGenerator>,
                &config,
            ),
            None => ConversationEngine::new(storage.clone(), rng.clone(), &config),
        };

        Ok(TestHarness {
            catalog: Catalog::new(storage.clone(), &config),
            ledger: Ledger::new(storage.clone()),
            engine,
            storage,
            rng,
            generator,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with scripted randomness and temp storage.
pub struct TestHarness {
    /// Storage backend (temp SQLite by default, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter>,
    /// The random source shared by the engine's gate and responder.
    pub rng: Arc<ScriptedRandom>,
    /// Mock generator, when configured with [`TestHarnessBuilder::with_mock_replies`].
    pub generator: Option<Arc<MockGenerator>>,
    pub engine: ConversationEngine,
    pub catalog: Catalog,
    pub ledger: Ledger,
    pub config: RapportConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A model named `name` with the given no-go topics.
    pub async fn model(&self, name: &str, no_go: &[&str]) -> Result<Model, RapportError> {
        let mut model = self.catalog.models.create(name).await?;
        for topic in no_go {
            model = self.catalog.models.add_no_go_topic(&model.id, topic).await?;
        }
        Ok(model)
    }

    pub async fn subscriber(&self, external_id: &str) -> Result<Subscriber, RapportError> {
        self.catalog
            .subscribers
            .create(external_id, None, SubscriberTier::Regular)
            .await
    }

    /// A conversation pre-filled with `history`, appended in order.
    pub async fn conversation(
        &self,
        subscriber: &Subscriber,
        model: &Model,
        history: &[Message],
    ) -> Result<Conversation, RapportError> {
        let conversation = self
            .engine
            .start_conversation(&subscriber.id, &model.id, None)
            .await?;
        for message in history {
            self.storage.append_message(&conversation.id, message).await?;
        }
        self.storage
            .get_conversation(&conversation.id)
            .await?
            .ok_or_else(|| RapportError::not_found("conversation", &conversation.id))
    }

    /// Drive one subscriber turn through the engine.
    pub async fn send(&self, conversation_id: &str, text: &str) -> Result<TurnOutcome, RapportError> {
        self.engine.handle_user_message(conversation_id, text).await
    }
}
