// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use rapport_config::model::StorageConfig;
use rapport_core::{
    AdapterType, ContentItem, Conversation, ConversationFilter, HealthStatus, Message, Model,
    PluginAdapter, RapportError, StorageAdapter, Subscriber, SubscriberFilter, Transaction,
    TransactionFilter,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// The connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already open database, e.g. an in-memory one.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    fn db(&self) -> Result<&Database, RapportError> {
        self.db.get().ok_or_else(|| RapportError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self) -> Result<(), RapportError> {
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RapportError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RapportError> {
        self.checkpoint().await
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), RapportError> {
        let db =
            Database::open_with_options(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| RapportError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RapportError> {
        self.db()?;
        self.checkpoint().await
    }

    // --- Models ---

    async fn list_models(&self) -> Result<Vec<Model>, RapportError> {
        queries::models::list_models(self.db()?).await
    }

    async fn get_model(&self, id: &str) -> Result<Option<Model>, RapportError> {
        queries::models::get_model(self.db()?, id).await
    }

    async fn insert_model(&self, model: &Model) -> Result<(), RapportError> {
        queries::models::insert_model(self.db()?, model).await
    }

    async fn update_model(&self, model: &Model) -> Result<(), RapportError> {
        queries::models::update_model(self.db()?, model).await
    }

    async fn delete_model(&self, id: &str) -> Result<bool, RapportError> {
        queries::models::delete_model(self.db()?, id).await
    }

    // --- Subscribers ---

    async fn list_subscribers(
        &self,
        filter: &SubscriberFilter,
    ) -> Result<Vec<Subscriber>, RapportError> {
        queries::subscribers::list_subscribers(self.db()?, filter).await
    }

    async fn get_subscriber(&self, id: &str) -> Result<Option<Subscriber>, RapportError> {
        queries::subscribers::get_subscriber(self.db()?, id).await
    }

    async fn insert_subscriber(&self, subscriber: &Subscriber) -> Result<(), RapportError> {
        queries::subscribers::insert_subscriber(self.db()?, subscriber).await
    }

    async fn update_subscriber(&self, subscriber: &Subscriber) -> Result<(), RapportError> {
        queries::subscribers::update_subscriber(self.db()?, subscriber).await
    }

    async fn delete_subscriber(&self, id: &str) -> Result<bool, RapportError> {
        queries::subscribers::delete_subscriber(self.db()?, id).await
    }

    // --- Content ---

    async fn list_content(&self, model_id: &str) -> Result<Vec<ContentItem>, RapportError> {
        queries::content::list_content(self.db()?, model_id).await
    }

    async fn get_content(&self, id: &str) -> Result<Option<ContentItem>, RapportError> {
        queries::content::get_content(self.db()?, id).await
    }

    async fn insert_content(&self, item: &ContentItem) -> Result<(), RapportError> {
        queries::content::insert_content(self.db()?, item).await
    }

    async fn update_content(&self, item: &ContentItem) -> Result<(), RapportError> {
        queries::content::update_content(self.db()?, item).await
    }

    async fn delete_content(&self, id: &str) -> Result<bool, RapportError> {
        queries::content::delete_content(self.db()?, id).await
    }

    async fn find_content_by_tags(
        &self,
        model_id: &str,
        tags: &[String],
    ) -> Result<Vec<ContentItem>, RapportError> {
        queries::content::find_by_tags(self.db()?, model_id, tags).await
    }

    // --- Conversations ---

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), RapportError> {
        queries::conversations::insert_conversation(self.db()?, conversation).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, RapportError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    async fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, RapportError> {
        queries::conversations::list_conversations(self.db()?, filter).await
    }

    async fn delete_conversation(&self, id: &str) -> Result<bool, RapportError> {
        queries::conversations::delete_conversation(self.db()?, id).await
    }

    async fn append_message(
        &self,
        conversation_id: &str,
        message: &Message,
    ) -> Result<usize, RapportError> {
        queries::conversations::append_message(self.db()?, conversation_id, message).await
    }

    // --- Transactions ---

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), RapportError> {
        queries::transactions::insert_transaction(self.db()?, transaction).await
    }

    async fn insert_spend_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Subscriber, RapportError> {
        queries::subscribers::insert_spend(self.db()?, transaction).await
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, RapportError> {
        queries::transactions::list_transactions(self.db()?, filter).await
    }
}
