// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends.
//!
//! One collection per entity: models, subscribers, content, conversations
//! and transactions. Conversation messages are append-only and ordered.

use async_trait::async_trait;

use crate::error::RapportError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ContentItem, Conversation, ConversationFilter, Message, Model, Subscriber, SubscriberFilter,
    Transaction, TransactionFilter,
};

/// Adapter for storage and persistence backends.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connections).
    async fn initialize(&self) -> Result<(), RapportError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), RapportError>;

    // --- Models ---

    /// All models ordered by creation time.
    async fn list_models(&self) -> Result<Vec<Model>, RapportError>;
    async fn get_model(&self, id: &str) -> Result<Option<Model>, RapportError>;
    async fn insert_model(&self, model: &Model) -> Result<(), RapportError>;
    /// Replaces every mutable field. Fails with `NotFound` for unknown ids.
    async fn update_model(&self, model: &Model) -> Result<(), RapportError>;
    /// Returns false when nothing was deleted.
    async fn delete_model(&self, id: &str) -> Result<bool, RapportError>;

    // --- Subscribers ---

    async fn list_subscribers(
        &self,
        filter: &SubscriberFilter,
    ) -> Result<Vec<Subscriber>, RapportError>;
    async fn get_subscriber(&self, id: &str) -> Result<Option<Subscriber>, RapportError>;
    async fn insert_subscriber(&self, subscriber: &Subscriber) -> Result<(), RapportError>;
    async fn update_subscriber(&self, subscriber: &Subscriber) -> Result<(), RapportError>;
    async fn delete_subscriber(&self, id: &str) -> Result<bool, RapportError>;

    // --- Content ---

    /// Content for a model ordered by creation time, then insertion order.
    async fn list_content(&self, model_id: &str) -> Result<Vec<ContentItem>, RapportError>;
    async fn get_content(&self, id: &str) -> Result<Option<ContentItem>, RapportError>;
    async fn insert_content(&self, item: &ContentItem) -> Result<(), RapportError>;
    async fn update_content(&self, item: &ContentItem) -> Result<(), RapportError>;
    async fn delete_content(&self, id: &str) -> Result<bool, RapportError>;

    /// Content of `model_id` sharing at least one tag with `tags`
    /// (case-insensitive), in `list_content` order.
    async fn find_content_by_tags(
        &self,
        model_id: &str,
        tags: &[String],
    ) -> Result<Vec<ContentItem>, RapportError>;

    // --- Conversations ---

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), RapportError>;
    /// Loads a conversation with its full message history.
    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, RapportError>;
    /// Conversations matching the filter, most recent interaction first.
    async fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, RapportError>;
    async fn delete_conversation(&self, id: &str) -> Result<bool, RapportError>;

    /// Appends a message and bumps `last_interaction`. Returns the new length.
    async fn append_message(
        &self,
        conversation_id: &str,
        message: &Message,
    ) -> Result<usize, RapportError>;

    // --- Transactions ---

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), RapportError>;
    /// Inserts `transaction`, adds its amount to the subscriber's lifetime
    /// spend and stamps `last_purchase`, as one unit. Neither write lands if
    /// the subscriber is missing.
    async fn insert_spend_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Subscriber, RapportError>;
    /// Transactions matching the filter, newest first.
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, RapportError>;
}
