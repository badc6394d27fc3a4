// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator workflows across models, subscribers, content and revenue.

use rapport_catalog::NewContent;
use rapport_core::{ContentType, Level, SubscriberTier};
use rapport_import::ImportFormat;
use rapport_test_utils::TestHarness;

#[tokio::test]
async fn csv_import_sets_style_used_by_conversations() {
    let h = TestHarness::builder().build().await.unwrap();
    let model = h.model("Mia", &[]).await.unwrap();

    let csv = "sender,message,timestamp\n\
               model,hey babe I miss you,2026-01-01T10:00:00Z\n\
               user,hi,2026-01-01T10:01:00Z\n\
               model,thinking of you babe,\n\
               user,,2026-01-01T10:02:00Z\n";
    let report = h
        .catalog
        .models
        .import_text(&model.id, ImportFormat::Csv, csv)
        .await
        .unwrap();
    assert_eq!(report.records, 3);
    assert_eq!(report.assistant_messages, 2);
    assert_eq!(report.profile.flirt_level, Level::High);

    let stored = h.catalog.models.get(&model.id).await.unwrap();
    assert_eq!(stored.style().unwrap().flirt_level, Level::High);
}

#[tokio::test]
async fn revenue_counts_tips_but_not_offers() {
    let h = TestHarness::builder().in_memory().build().await.unwrap();
    let mia = h.model("Mia", &[]).await.unwrap();
    let zoe = h.model("Zoe", &[]).await.unwrap();
    let sub = h
        .catalog
        .subscribers
        .create("of-9", Some("Sam"), SubscriberTier::Vip)
        .await
        .unwrap();

    let clip = h
        .catalog
        .content
        .add(
            &mia.id,
            NewContent {
                title: "Gym".into(),
                description: Some("post workout".into()),
                content_url: "https://cdn.example/gym.jpg".into(),
                content_type: ContentType::Image,
                tags: vec!["gym".into()],
                price: 8.0,
            },
        )
        .await
        .unwrap();
    h.catalog.content.send_ppv(&sub.id, &clip.id).await.unwrap();
    h.catalog.subscribers.record_tip(&sub.id, &mia.id, 12.0).await.unwrap();
    h.catalog.subscribers.record_tip(&sub.id, &zoe.id, 3.0).await.unwrap();

    let mia_summary = h.ledger.summary(Some(&mia.id)).await.unwrap();
    assert_eq!(mia_summary.total, 12.0);
    assert_eq!(mia_summary.tips, 12.0);
    assert_eq!(mia_summary.offers_sent, 1);

    let all = h.ledger.summary(None).await.unwrap();
    assert_eq!(all.total, 15.0);

    let sub = h.catalog.subscribers.get(&sub.id).await.unwrap();
    assert_eq!(sub.total_spent, 15.0);
    assert_eq!(h.catalog.subscribers.transactions(&sub.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn do_not_message_blocks_initiation() {
    let h = TestHarness::builder().build().await.unwrap();
    let model = h.model("Mia", &[]).await.unwrap();
    let sub = h.subscriber("fan").await.unwrap();
    h.catalog.subscribers.set_do_not_message(&sub.id, true).await.unwrap();

    let started = h.engine.initiate_conversation(&sub.id, &model.id).await.unwrap();
    assert!(started.is_none());
    assert!(
        h.engine
            .conversations_for_subscriber(&sub.id)
            .await
            .unwrap()
            .is_empty()
    );
}
