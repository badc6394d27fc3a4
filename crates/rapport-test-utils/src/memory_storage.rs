// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage adapter for deterministic testing.
//!
//! `MemoryStorage` implements `StorageAdapter` with the same ordering,
//! filtering and not-found semantics as the SQLite backend, so engine and
//! catalog tests can run without touching disk.

use std::cmp::Reverse;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rapport_core::{
    AdapterType, ContentItem, Conversation, ConversationFilter, HealthStatus, Message, Model,
    PluginAdapter, RapportError, StorageAdapter, Subscriber, SubscriberFilter, Transaction,
    TransactionFilter,
};

/// Collections kept in insertion order; insertion order breaks ordering ties.
#[derive(Default)]
struct State {
    models: Vec<Model>,
    subscribers: Vec<Subscriber>,
    content: Vec<ContentItem>,
    conversations: Vec<Conversation>,
    transactions: Vec<Transaction>,
}

/// A storage adapter holding every collection in process memory.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(entity: &str, id: &str) -> RapportError {
    RapportError::storage(format!("duplicate {entity} id: {id}"))
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, key: impl Fn(&T) -> &str) -> bool {
    let before = items.len();
    items.retain(|item| key(item) != id);
    items.len() != before
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RapportError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RapportError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), RapportError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), RapportError> {
        Ok(())
    }

    // --- Models ---

    async fn list_models(&self) -> Result<Vec<Model>, RapportError> {
        let mut models = self.state.lock().await.models.clone();
        models.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(models)
    }

    async fn get_model(&self, id: &str) -> Result<Option<Model>, RapportError> {
        let state = self.state.lock().await;
        Ok(state.models.iter().find(|m| m.id == id).cloned())
    }

    async fn insert_model(&self, model: &Model) -> Result<(), RapportError> {
        let mut state = self.state.lock().await;
        if state.models.iter().any(|m| m.id == model.id) {
            return Err(duplicate("model", &model.id));
        }
        state.models.push(model.clone());
        Ok(())
    }

    async fn update_model(&self, model: &Model) -> Result<(), RapportError> {
        let mut state = self.state.lock().await;
        let existing = state
            .models
            .iter_mut()
            .find(|m| m.id == model.id)
            .ok_or_else(|| RapportError::not_found("model", &model.id))?;
        let created_at = std::mem::take(&mut existing.created_at);
        *existing = Model {
            created_at,
            ..model.clone()
        };
        Ok(())
    }

    async fn delete_model(&self, id: &str) -> Result<bool, RapportError> {
        let mut state = self.state.lock().await;
        Ok(remove_by_id(&mut state.models, id, |m| &m.id))
    }

    // --- Subscribers ---

    async fn list_subscribers(
        &self,
        filter: &SubscriberFilter,
    ) -> Result<Vec<Subscriber>, RapportError> {
        let state = self.state.lock().await;
        let mut subs: Vec<Subscriber> = state
            .subscribers
            .iter()
            .filter(|s| filter.do_not_message.is_none_or(|dnm| s.do_not_message == dnm))
            .filter(|s| filter.tier.as_ref().is_none_or(|tier| &s.tier == tier))
            .cloned()
            .collect();
        subs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(subs)
    }

    async fn get_subscriber(&self, id: &str) -> Result<Option<Subscriber>, RapportError> {
        let state = self.state.lock().await;
        Ok(state.subscribers.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_subscriber(&self, subscriber: &Subscriber) -> Result<(), RapportError> {
        let mut state = self.state.lock().await;
        if state.subscribers.iter().any(|s| s.id == subscriber.id) {
            return Err(duplicate("subscriber", &subscriber.id));
        }
        state.subscribers.push(subscriber.clone());
        Ok(())
    }

    async fn update_subscriber(&self, subscriber: &Subscriber) -> Result<(), RapportError> {
        let mut state = self.state.lock().await;
        let existing = state
            .subscribers
            .iter_mut()
            .find(|s| s.id == subscriber.id)
            .ok_or_else(|| RapportError::not_found("subscriber", &subscriber.id))?;
        let created_at = std::mem::take(&mut existing.created_at);
        *existing = Subscriber {
            created_at,
            ..subscriber.clone()
        };
        Ok(())
    }

    async fn delete_subscriber(&self, id: &str) -> Result<bool, RapportError> {
        let mut state = self.state.lock().await;
        Ok(remove_by_id(&mut state.subscribers, id, |s| &s.id))
    }

    // --- Content ---

    async fn list_content(&self, model_id: &str) -> Result<Vec<ContentItem>, RapportError> {
        let state = self.state.lock().await;
        let mut items: Vec<ContentItem> = state
            .content
            .iter()
            .filter(|c| c.model_id == model_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    async fn get_content(&self, id: &str) -> Result<Option<ContentItem>, RapportError> {
        let state = self.state.lock().await;
        Ok(state.content.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_content(&self, item: &ContentItem) -> Result<(), RapportError> {
        let mut state = self.state.lock().await;
        if state.content.iter().any(|c| c.id == item.id) {
            return Err(duplicate("content", &item.id));
        }
        state.content.push(item.clone());
        Ok(())
    }

    async fn update_content(&self, item: &ContentItem) -> Result<(), RapportError> {
        let mut state = self.state.lock().await;
        let existing = state
            .content
            .iter_mut()
            .find(|c| c.id == item.id)
            .ok_or_else(|| RapportError::not_found("content", &item.id))?;
        let created_at = std::mem::take(&mut existing.created_at);
        *existing = ContentItem {
            created_at,
            ..item.clone()
        };
        Ok(())
    }

    async fn delete_content(&self, id: &str) -> Result<bool, RapportError> {
        let mut state = self.state.lock().await;
        Ok(remove_by_id(&mut state.content, id, |c| &c.id))
    }

    async fn find_content_by_tags(
        &self,
        model_id: &str,
        tags: &[String],
    ) -> Result<Vec<ContentItem>, RapportError> {
        let wanted: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
        let items = self.list_content(model_id).await?;
        Ok(items
            .into_iter()
            .filter(|c| c.tags.iter().any(|t| wanted.contains(&t.to_lowercase())))
            .collect())
    }

    // --- Conversations ---

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), RapportError> {
        let mut state = self.state.lock().await;
        if state.conversations.iter().any(|c| c.id == conversation.id) {
            return Err(duplicate("conversation", &conversation.id));
        }
        state.conversations.push(conversation.clone());
        Ok(())
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, RapportError> {
        let state = self.state.lock().await;
        Ok(state.conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, RapportError> {
        let state = self.state.lock().await;
        let mut convs: Vec<Conversation> = state
            .conversations
            .iter()
            .rev()
            .filter(|c| {
                filter
                    .subscriber_id
                    .as_ref()
                    .is_none_or(|id| &c.subscriber_id == id)
            })
            .filter(|c| filter.model_id.as_ref().is_none_or(|id| &c.model_id == id))
            .cloned()
            .collect();
        convs.sort_by_key(|c| Reverse(c.last_interaction.clone()));
        Ok(convs)
    }

    async fn delete_conversation(&self, id: &str) -> Result<bool, RapportError> {
        let mut state = self.state.lock().await;
        Ok(remove_by_id(&mut state.conversations, id, |c| &c.id))
    }

    async fn append_message(
        &self,
        conversation_id: &str,
        message: &Message,
    ) -> Result<usize, RapportError> {
        let mut state = self.state.lock().await;
        let conv = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| RapportError::not_found("conversation", conversation_id))?;
        conv.messages.push(message.clone());
        conv.last_interaction = message.timestamp.clone();
        Ok(conv.messages.len())
    }

    // --- Transactions ---

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), RapportError> {
        let mut state = self.state.lock().await;
        if state.transactions.iter().any(|t| t.id == transaction.id) {
            return Err(duplicate("transaction", &transaction.id));
        }
        state.transactions.push(transaction.clone());
        Ok(())
    }

    async fn insert_spend_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Subscriber, RapportError> {
        let mut state = self.state.lock().await;
        if state.transactions.iter().any(|t| t.id == transaction.id) {
            return Err(duplicate("transaction", &transaction.id));
        }
        let sub = state
            .subscribers
            .iter_mut()
            .find(|s| s.id == transaction.subscriber_id)
            .ok_or_else(|| RapportError::not_found("subscriber", &transaction.subscriber_id))?;
        sub.total_spent += transaction.amount;
        sub.last_purchase = Some(transaction.created_at.clone());
        sub.updated_at = transaction.created_at.clone();
        let sub = sub.clone();
        state.transactions.push(transaction.clone());
        Ok(sub)
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, RapportError> {
        let state = self.state.lock().await;
        let mut txns: Vec<Transaction> = state
            .transactions
            .iter()
            .rev()
            .filter(|t| {
                filter
                    .subscriber_id
                    .as_ref()
                    .is_none_or(|id| &t.subscriber_id == id)
            })
            .filter(|t| filter.model_id.as_ref().is_none_or(|id| &t.model_id == id))
            .filter(|t| filter.since.as_ref().is_none_or(|s| &t.created_at >= s))
            .filter(|t| filter.until.as_ref().is_none_or(|u| &t.created_at <= u))
            .cloned()
            .collect();
        txns.sort_by_key(|t| Reverse(t.created_at.clone()));
        Ok(txns)
    }
}
