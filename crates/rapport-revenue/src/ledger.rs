// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transaction ledger.
//!
//! Every monetizable event (tip, purchase, subscription, sent offer) becomes
//! one immutable row. The ledger assigns ids, timestamps and a local
//! external reference, and answers revenue questions over the stored rows.

use std::sync::Arc;

use rapport_core::{
    ContentItem, RapportError, StorageAdapter, Subscriber, Transaction, TransactionFilter,
    TransactionType, new_id, now_timestamp,
};
use tracing::info;

use crate::summary::RevenueSummary;

/// Persistent transaction ledger over the configured storage backend.
#[derive(Clone)]
pub struct Ledger {
    storage: Arc<dyn StorageAdapter>,
}

impl Ledger {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Record a transaction. `amount` must be finite and non-negative.
    pub async fn record(
        &self,
        subscriber_id: &str,
        model_id: &str,
        content_id: Option<&str>,
        transaction_type: TransactionType,
        amount: f64,
    ) -> Result<Transaction, RapportError> {
        let txn = entry(subscriber_id, model_id, content_id, transaction_type, amount)?;
        self.storage.insert_transaction(&txn).await?;
        log_recorded(&txn);
        Ok(txn)
    }

    /// Record money received from a subscriber and add it to their lifetime
    /// spend. The row and the spend move together or not at all.
    pub async fn record_spend(
        &self,
        subscriber_id: &str,
        model_id: &str,
        content_id: Option<&str>,
        transaction_type: TransactionType,
        amount: f64,
    ) -> Result<(Transaction, Subscriber), RapportError> {
        let txn = entry(subscriber_id, model_id, content_id, transaction_type, amount)?;
        let subscriber = self.storage.insert_spend_transaction(&txn).await?;
        log_recorded(&txn);
        Ok((txn, subscriber))
    }

    /// Record that a PPV offer for `item` was sent to a subscriber.
    pub async fn record_offer(
        &self,
        subscriber_id: &str,
        item: &ContentItem,
    ) -> Result<Transaction, RapportError> {
        self.record(
            subscriber_id,
            &item.model_id,
            Some(&item.id),
            TransactionType::PpvSent,
            item.price,
        )
        .await
    }

    /// Transactions matching `filter`, newest first.
    pub async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, RapportError> {
        self.storage.list_transactions(filter).await
    }

    /// Revenue for one model, or for every model when `model_id` is `None`.
    pub async fn summary(&self, model_id: Option<&str>) -> Result<RevenueSummary, RapportError> {
        let filter = TransactionFilter {
            model_id: model_id.map(str::to_string),
            ..TransactionFilter::default()
        };
        let txns = self.storage.list_transactions(&filter).await?;
        Ok(RevenueSummary::from_transactions(&txns))
    }

    /// Revenue with `created_at` inside `[since, until]`.
    pub async fn summary_between(
        &self,
        since: &str,
        until: &str,
        model_id: Option<&str>,
    ) -> Result<RevenueSummary, RapportError> {
        if since > until {
            return Err(RapportError::validation(
                "range",
                format!("start {since} is after end {until}"),
            ));
        }
        let filter = TransactionFilter {
            model_id: model_id.map(str::to_string),
            since: Some(since.to_string()),
            until: Some(until.to_string()),
            ..TransactionFilter::default()
        };
        let txns = self.storage.list_transactions(&filter).await?;
        Ok(RevenueSummary::from_transactions(&txns))
    }
}

fn entry(
    subscriber_id: &str,
    model_id: &str,
    content_id: Option<&str>,
    transaction_type: TransactionType,
    amount: f64,
) -> Result<Transaction, RapportError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(RapportError::validation(
            "amount",
            format!("must be a finite, non-negative number, got {amount}"),
        ));
    }
    Ok(Transaction {
        id: new_id(),
        subscriber_id: subscriber_id.to_string(),
        model_id: model_id.to_string(),
        content_id: content_id.map(str::to_string),
        transaction_type,
        amount,
        external_transaction_id: Some(format!("local-{}", uuid::Uuid::new_v4())),
        created_at: now_timestamp(),
    })
}

fn log_recorded(txn: &Transaction) {
    info!(
        transaction_id = %txn.id,
        subscriber_id = %txn.subscriber_id,
        model_id = %txn.model_id,
        kind = %txn.transaction_type,
        amount = txn.amount,
        "transaction recorded"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapport_config::model::StorageConfig;
    use rapport_core::ContentType;
    use rapport_storage::{Database, SqliteStorage};

    async fn ledger() -> Ledger {
        let db = Database::open_in_memory().await.unwrap();
        let storage = SqliteStorage::from_database(StorageConfig::default(), db);
        Ledger::new(Arc::new(storage))
    }

    #[tokio::test]
    async fn record_assigns_local_reference() {
        let ledger = ledger().await;
        let txn = ledger
            .record("s1", "m1", None, TransactionType::Tip, 10.0)
            .await
            .unwrap();
        assert!(
            txn.external_transaction_id
                .as_deref()
                .unwrap()
                .starts_with("local-")
        );
        assert_eq!(ledger.list(&TransactionFilter::default()).await.unwrap(), vec![txn]);
    }

    #[tokio::test]
    async fn rejects_negative_and_nan_amounts() {
        let ledger = ledger().await;
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = ledger
                .record("s1", "m1", None, TransactionType::Tip, bad)
                .await
                .unwrap_err();
            assert!(matches!(err, RapportError::Validation { .. }));
        }
        assert!(ledger.list(&TransactionFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn spend_is_all_or_nothing() {
        let db = Database::open_in_memory().await.unwrap();
        let storage = Arc::new(SqliteStorage::from_database(StorageConfig::default(), db));
        let ledger = Ledger::new(storage.clone());
        let sub = Subscriber::new("of-1");
        storage.insert_subscriber(&sub).await.unwrap();

        let (txn, updated) = ledger
            .record_spend(&sub.id, "m1", None, TransactionType::Tip, 12.5)
            .await
            .unwrap();
        assert_eq!(updated.total_spent, 12.5);
        assert_eq!(updated.last_purchase.as_deref(), Some(txn.created_at.as_str()));

        let err = ledger
            .record_spend("ghost", "m1", None, TransactionType::Tip, 3.0)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(ledger.list(&TransactionFilter::default()).await.unwrap(), vec![txn]);
    }

    #[tokio::test]
    async fn offers_do_not_count_as_revenue() {
        let ledger = ledger().await;
        let item = ContentItem::new("m1", "Shower clip", "s3://v/2.mp4", ContentType::Video, 30.0);
        let offer = ledger.record_offer("s1", &item).await.unwrap();
        assert_eq!(offer.transaction_type, TransactionType::PpvSent);
        assert_eq!(offer.content_id.as_deref(), Some(item.id.as_str()));

        ledger
            .record("s1", "m1", Some(&item.id), TransactionType::Ppv, 30.0)
            .await
            .unwrap();
        ledger
            .record("s2", "m2", None, TransactionType::Tip, 5.0)
            .await
            .unwrap();

        let m1 = ledger.summary(Some("m1")).await.unwrap();
        assert!((m1.total - 30.0).abs() < 1e-9);
        assert_eq!(m1.offers_sent, 1);

        let all = ledger.summary(None).await.unwrap();
        assert!((all.total - 35.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn summary_between_rejects_inverted_range() {
        let ledger = ledger().await;
        let err = ledger
            .summary_between("2026-02-01T00:00:00.000Z", "2026-01-01T00:00:00.000Z", None)
            .await
            .unwrap_err();
        assert!(matches!(err, RapportError::Validation { .. }));

        let empty = ledger
            .summary_between("2020-01-01T00:00:00.000Z", "2020-12-31T23:59:59.999Z", None)
            .await
            .unwrap();
        assert_eq!(empty, RevenueSummary::default());
    }
}
