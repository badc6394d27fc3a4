// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscriber records, do-not-message flags and tips.

use std::sync::Arc;

use rapport_core::{
    RapportError, StorageAdapter, Subscriber, SubscriberFilter, SubscriberTier, Transaction,
    TransactionFilter, TransactionType, now_timestamp,
};
use rapport_revenue::Ledger;
use tracing::info;

use crate::required;

/// A recorded tip and the subscriber's updated totals.
#[derive(Debug, Clone)]
pub struct TipReceipt {
    pub subscriber: Subscriber,
    pub transaction: Transaction,
}

#[derive(Clone)]
pub struct SubscriberCatalog {
    storage: Arc<dyn StorageAdapter>,
    ledger: Ledger,
}

impl SubscriberCatalog {
    pub fn new(storage: Arc<dyn StorageAdapter>, ledger: Ledger) -> Self {
        Self { storage, ledger }
    }

    pub async fn create(
        &self,
        external_id: &str,
        name: Option<&str>,
        tier: SubscriberTier,
    ) -> Result<Subscriber, RapportError> {
        let mut subscriber = Subscriber::new(required("external_id", external_id)?);
        subscriber.name = name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
        subscriber.tier = tier;
        self.storage.insert_subscriber(&subscriber).await?;
        info!(subscriber_id = %subscriber.id, external_id = %subscriber.external_id, "subscriber created");
        Ok(subscriber)
    }

    pub async fn list(&self, filter: &SubscriberFilter) -> Result<Vec<Subscriber>, RapportError> {
        self.storage.list_subscribers(filter).await
    }

    /// Subscribers who may be messaged (not flagged do-not-message).
    pub async fn list_eligible(&self) -> Result<Vec<Subscriber>, RapportError> {
        let filter = SubscriberFilter {
            do_not_message: Some(false),
            ..SubscriberFilter::default()
        };
        self.storage.list_subscribers(&filter).await
    }

    pub async fn get(&self, id: &str) -> Result<Subscriber, RapportError> {
        self.storage
            .get_subscriber(id)
            .await?
            .ok_or_else(|| RapportError::not_found("subscriber", id))
    }

    /// Change the display name and/or tier. `None` leaves a field untouched.
    pub async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        tier: Option<SubscriberTier>,
    ) -> Result<Subscriber, RapportError> {
        let mut subscriber = self.get(id).await?;
        if let Some(name) = name {
            subscriber.name = Some(required("name", name)?);
        }
        if let Some(tier) = tier {
            subscriber.tier = tier;
        }
        subscriber.updated_at = now_timestamp();
        self.storage.update_subscriber(&subscriber).await?;
        Ok(subscriber)
    }

    pub async fn set_do_not_message(
        &self,
        id: &str,
        do_not_message: bool,
    ) -> Result<Subscriber, RapportError> {
        let mut subscriber = self.get(id).await?;
        subscriber.do_not_message = do_not_message;
        subscriber.updated_at = now_timestamp();
        self.storage.update_subscriber(&subscriber).await?;
        info!(subscriber_id = id, do_not_message, "do-not-message updated");
        Ok(subscriber)
    }

    /// Record a tip: writes a `tip` transaction and adds to lifetime spend.
    pub async fn record_tip(
        &self,
        subscriber_id: &str,
        model_id: &str,
        amount: f64,
    ) -> Result<TipReceipt, RapportError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(RapportError::validation(
                "amount",
                format!("must be a positive number, got {amount}"),
            ));
        }
        self.get(subscriber_id).await?;
        if self.storage.get_model(model_id).await?.is_none() {
            return Err(RapportError::not_found("model", model_id));
        }

        let (transaction, subscriber) = self
            .ledger
            .record_spend(subscriber_id, model_id, None, TransactionType::Tip, amount)
            .await?;
        Ok(TipReceipt {
            subscriber,
            transaction,
        })
    }

    /// A subscriber's transactions, newest first.
    pub async fn transactions(&self, subscriber_id: &str) -> Result<Vec<Transaction>, RapportError> {
        let filter = TransactionFilter {
            subscriber_id: Some(subscriber_id.to_string()),
            ..TransactionFilter::default()
        };
        self.ledger.list(&filter).await
    }
}
