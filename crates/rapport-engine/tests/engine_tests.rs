// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end conversation turns through the test harness.

use rapport_catalog::NewContent;
use rapport_core::{ContentType, Message, Role, TransactionFilter, TransactionType};
use rapport_engine::{ReplyKind, UpsellDecision};
use rapport_test_utils::TestHarness;

fn chatter(n: usize) -> Vec<Message> {
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                Message::user(format!("hey {i}"))
            } else {
                Message::assistant(format!("hi {i}"))
            }
        })
        .collect()
}

fn shower_clip() -> NewContent {
    NewContent {
        title: "After Shower".into(),
        description: None,
        content_url: "https://cdn.example/shower.mp4".into(),
        content_type: ContentType::Video,
        tags: vec!["shower".into()],
        price: 20.0,
    }
}

#[tokio::test]
async fn shallow_history_never_offers_or_draws() {
    let h = TestHarness::builder()
        .with_mock_replies(vec!["aww".into()])
        .build()
        .await
        .unwrap();
    let model = h.model("Mia", &[]).await.unwrap();
    let sub = h.subscriber("fan").await.unwrap();
    let conv = h.conversation(&sub, &model, &chatter(2)).await.unwrap();

    let outcome = h.send(&conv.id, "wow amazing!!").await.unwrap();
    assert_eq!(outcome.decision, UpsellDecision::TooEarly);
    assert_eq!(outcome.kind, ReplyKind::Persona);
    assert_eq!(outcome.reply.content, "aww");
    assert_eq!(h.rng.consumed(), 0);
}

#[tokio::test]
async fn disengaged_message_is_blocked_without_randomness() {
    let h = TestHarness::builder()
        .with_mock_replies(vec![])
        .in_memory()
        .build()
        .await
        .unwrap();
    let model = h.model("Mia", &[]).await.unwrap();
    let sub = h.subscriber("fan").await.unwrap();
    let conv = h.conversation(&sub, &model, &chatter(6)).await.unwrap();

    let outcome = h.send(&conv.id, "ok sure").await.unwrap();
    assert_eq!(outcome.decision, UpsellDecision::SentimentBlocked);
    assert_eq!(h.rng.consumed(), 0);

    let outcome = h.send(&conv.id, "no, I can't, wow").await.unwrap();
    assert_eq!(outcome.decision, UpsellDecision::SentimentBlocked);
    assert_eq!(h.rng.consumed(), 0);
}

#[tokio::test]
async fn offer_then_cooldown() {
    let h = TestHarness::builder()
        .with_draws(vec![0.1])
        .with_mock_replies(vec![])
        .build()
        .await
        .unwrap();
    let model = h.model("Mia", &[]).await.unwrap();
    let sub = h.subscriber("fan").await.unwrap();
    let clip = h.catalog.content.add(&model.id, shower_clip()).await.unwrap();
    let conv = h.conversation(&sub, &model, &chatter(3)).await.unwrap();

    let first = h.send(&conv.id, "wow tell me about your shower").await.unwrap();
    assert_eq!(first.decision, UpsellDecision::Approved);
    assert!(matches!(
        &first.kind,
        ReplyKind::Offer { content_id, transaction_id: Some(_) } if *content_id == clip.id
    ));
    assert!(first.reply.content.contains("After Shower"));
    assert!(first.reply.content.contains("$20.00"));

    let second = h.send(&conv.id, "wow show me more shower").await.unwrap();
    assert_eq!(second.decision, UpsellDecision::CoolingDown);
    assert_eq!(second.kind, ReplyKind::Persona);
    assert_eq!(h.rng.consumed(), 1);

    let offers = h
        .ledger
        .list(&TransactionFilter {
            subscriber_id: Some(sub.id.clone()),
            ..TransactionFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].transaction_type, TransactionType::PpvSent);
    assert_eq!(offers[0].amount, 20.0);

    let summary = h.ledger.summary(Some(&model.id)).await.unwrap();
    assert_eq!(summary.total, 0.0);
    assert_eq!(summary.offers_sent, 1);
}

#[tokio::test]
async fn dampener_declines_above_threshold() {
    let h = TestHarness::builder()
        .with_draws(vec![0.3])
        .with_mock_replies(vec!["later babe".into()])
        .in_memory()
        .build()
        .await
        .unwrap();
    let model = h.model("Mia", &[]).await.unwrap();
    let sub = h.subscriber("fan").await.unwrap();
    h.catalog.content.add(&model.id, shower_clip()).await.unwrap();
    let conv = h.conversation(&sub, &model, &chatter(3)).await.unwrap();

    let outcome = h.send(&conv.id, "wow tell me about your shower").await.unwrap();
    assert_eq!(outcome.decision, UpsellDecision::Dampened);
    assert_eq!(outcome.reply.content, "later babe");
}

#[tokio::test]
async fn no_go_topic_skips_generation() {
    let h = TestHarness::builder()
        .with_mock_replies(vec!["never used".into()])
        .build()
        .await
        .unwrap();
    let model = h.model("Mia", &["money"]).await.unwrap();
    let sub = h.subscriber("fan").await.unwrap();
    let conv = h.conversation(&sub, &model, &[]).await.unwrap();

    let outcome = h.send(&conv.id, "can I send you money").await.unwrap();
    assert_eq!(outcome.kind, ReplyKind::Deflection);
    assert_eq!(outcome.reply.content, h.config.persona.deflection);
    assert_eq!(h.generator.as_ref().unwrap().calls(), 0);
}

#[tokio::test]
async fn turns_are_persisted_in_order() {
    for in_memory in [false, true] {
        let builder = TestHarness::builder().with_mock_replies(vec!["one".into()]);
        let builder = if in_memory { builder.in_memory() } else { builder };
        let h = builder.build().await.unwrap();
        let model = h.model("Mia", &[]).await.unwrap();
        let sub = h.subscriber("fan").await.unwrap();
        let conv = h.conversation(&sub, &model, &[]).await.unwrap();

        let outcome = h.send(&conv.id, "hello there").await.unwrap();
        let stored = h.storage.get_conversation(&conv.id).await.unwrap().unwrap();
        assert_eq!(stored.messages.len(), 2);
        assert_eq!(stored.messages[0], outcome.user_message);
        assert_eq!(stored.messages[1], outcome.reply);
        assert_eq!(stored.messages[1].role, Role::Assistant);
        assert_eq!(stored.last_interaction, outcome.reply.timestamp);
    }
}

#[tokio::test]
async fn no_go_topic_overrides_an_open_offer_window() {
    let h = TestHarness::builder().in_memory().build().await.unwrap();
    let model = h.model("Mia", &["money"]).await.unwrap();
    let sub = h.subscriber("fan").await.unwrap();
    h.catalog.content.add(&model.id, shower_clip()).await.unwrap();
    let conv = h.conversation(&sub, &model, &chatter(3)).await.unwrap();

    let outcome = h
        .send(&conv.id, "wow can I send you money for the shower")
        .await
        .unwrap();
    assert_eq!(outcome.decision, UpsellDecision::NoGoTopic);
    assert_eq!(outcome.kind, ReplyKind::Deflection);
    assert_eq!(outcome.reply.content, h.config.persona.deflection);
    assert_eq!(h.rng.consumed(), 0);

    let summary = h.ledger.summary(Some(&model.id)).await.unwrap();
    assert_eq!(summary.offers_sent, 0);
}
