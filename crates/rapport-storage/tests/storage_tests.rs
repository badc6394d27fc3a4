// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of `SqliteStorage` through the `StorageAdapter` trait.

use std::sync::Arc;

use rapport_config::model::StorageConfig;
use rapport_core::{
    ContentItem, ContentType, Conversation, Message, Model, StorageAdapter, Subscriber,
    Transaction, TransactionFilter, TransactionType,
};
use rapport_storage::SqliteStorage;
use tempfile::TempDir;

async fn open() -> (Arc<SqliteStorage>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rapport.db");
    let storage = SqliteStorage::new(StorageConfig {
        database_path: path.to_str().unwrap().to_string(),
        wal_mode: true,
    });
    storage.initialize().await.unwrap();
    (Arc::new(storage), dir)
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("persist.db").to_str().unwrap().to_string();
    let config = StorageConfig {
        database_path: path.clone(),
        wal_mode: true,
    };

    let model = Model::new("Ava");
    {
        let storage = SqliteStorage::new(config.clone());
        storage.initialize().await.unwrap();
        storage.insert_model(&model).await.unwrap();
        storage.close().await.unwrap();
    }

    let storage = SqliteStorage::new(config);
    storage.initialize().await.unwrap();
    let loaded = storage.get_model(&model.id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Ava");
}

#[tokio::test]
async fn concurrent_appends_are_not_lost() {
    let (storage, _dir) = open().await;
    let conv = Conversation::new("s1", "m1");
    storage.insert_conversation(&conv).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let storage = Arc::clone(&storage);
        let id = conv.id.clone();
        handles.push(tokio::spawn(async move {
            storage
                .append_message(&id, &Message::user(format!("message {i}")))
                .await
                .unwrap()
        }));
    }
    let mut lengths = Vec::new();
    for h in handles {
        lengths.push(h.await.unwrap());
    }
    lengths.sort_unstable();
    assert_eq!(lengths, (1..=20).collect::<Vec<_>>());

    let loaded = storage.get_conversation(&conv.id).await.unwrap().unwrap();
    assert_eq!(loaded.messages.len(), 20);
}

#[tokio::test]
async fn catalog_entities_roundtrip_through_trait() {
    let (storage, _dir) = open().await;

    let model = Model::new("Mia");
    storage.insert_model(&model).await.unwrap();

    let sub = Subscriber::new("of-42");
    storage.insert_subscriber(&sub).await.unwrap();

    let mut item = ContentItem::new(&model.id, "Lingerie set", "s3://v/1.jpg", ContentType::Image, 25.0);
    item.tags = vec!["lingerie".into(), "red".into()];
    storage.insert_content(&item).await.unwrap();

    let found = storage
        .find_content_by_tags(&model.id, &["red".to_string()])
        .await
        .unwrap();
    assert_eq!(found, vec![item]);

    let purchase = Transaction {
        id: "txn-1".into(),
        subscriber_id: sub.id.clone(),
        model_id: model.id.clone(),
        content_id: Some(found[0].id.clone()),
        transaction_type: TransactionType::Ppv,
        amount: 25.0,
        external_transaction_id: None,
        created_at: "2026-04-01T12:00:00.000Z".into(),
    };
    let updated = storage.insert_spend_transaction(&purchase).await.unwrap();
    assert!((updated.total_spent - 25.0).abs() < 1e-9);
    let rows = storage
        .list_transactions(&TransactionFilter::default())
        .await
        .unwrap();
    assert_eq!(rows, vec![purchase]);
}
