// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestrator: advances a conversation by one subscriber turn.
//!
//! A turn goes through: append the user message -> score sentiment ->
//! evaluate the upsell gate -> (offer matched content | persona reply) ->
//! append the assistant message.
//!
//! The engine integrates:
//! - **Upsell gate**: depth, sentiment, cooldown and random dampener
//! - **Content matcher**: keyword-to-tag lookup over the model's vault
//! - **Response selector**: no-go deflection before persona generation
//! - **Ledger**: a `ppv_sent` transaction for every offer made

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rapport_config::model::RapportConfig;
use rapport_core::{
    ContentItem, Conversation, ConversationFilter, Message, RandomSource, RapportError,
    ResponseContext, ResponseGenerator, StorageAdapter,
};
use rapport_revenue::Ledger;
use tracing::{debug, info, warn};

use crate::keywords::KeywordExtractor;
use crate::matcher::ContentMatcher;
use crate::responder::{PersonaResponder, ResponseSelector, Selection, find_no_go};
use crate::sentiment::score_sentiment;
use crate::upsell::{UpsellDecision, UpsellGate};

const OPENING_LINES: &[&str] = &[
    "Hey there! I was just thinking about you...",
    "I just posted something new and thought you might want a sneak peek 😘",
    "Happy {weekday}! How's your day going?",
    "I'm feeling a bit lonely today... want to chat?",
    "I had a dream about you last night...",
];

/// How the assistant replied to a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyKind {
    /// A PPV offer; `transaction_id` is `None` when the ledger write failed.
    Offer {
        content_id: String,
        transaction_id: Option<String>,
    },
    Deflection,
    Persona,
}

/// Result of [`ConversationEngine::handle_user_message`].
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub user_message: Message,
    pub reply: Message,
    pub kind: ReplyKind,
    pub decision: UpsellDecision,
}

/// Fill `{title}` and `{price}` in an offer template.
pub fn render_offer(template: &str, item: &ContentItem) -> String {
    template
        .replace("{title}", &item.title)
        .replace("{price}", &format!("{:.2}", item.price))
}

/// Drives conversations for every model and subscriber.
pub struct ConversationEngine {
    storage: Arc<dyn StorageAdapter>,
    rng: Arc<dyn RandomSource>,
    gate: UpsellGate,
    extractor: KeywordExtractor,
    matcher: ContentMatcher,
    selector: ResponseSelector,
    ledger: Ledger,
    offer_template: String,
}

impl ConversationEngine {
    /// Engine with the built-in [`PersonaResponder`].
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        rng: Arc<dyn RandomSource>,
        config: &RapportConfig,
    ) -> Self {
        let generator = Arc::new(PersonaResponder::new(rng.clone()));
        Self::with_generator(storage, rng, generator, config)
    }

    /// Engine with a caller-supplied response generator.
    pub fn with_generator(
        storage: Arc<dyn StorageAdapter>,
        rng: Arc<dyn RandomSource>,
        generator: Arc<dyn ResponseGenerator>,
        config: &RapportConfig,
    ) -> Self {
        Self {
            gate: UpsellGate::new(config.upsell.clone()),
            extractor: KeywordExtractor::from_config(&config.matching),
            matcher: ContentMatcher::new(storage.clone()),
            selector: ResponseSelector::new(generator, config.persona.deflection.clone()),
            ledger: Ledger::new(storage.clone()),
            offer_template: config.upsell.offer_template.clone(),
            storage,
            rng,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    async fn load(&self, conversation_id: &str) -> Result<Conversation, RapportError> {
        self.storage
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| RapportError::not_found("conversation", conversation_id))
    }

    /// Process one subscriber message and append the assistant's reply.
    pub async fn handle_user_message(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> Result<TurnOutcome, RapportError> {
        let conversation = self.load(conversation_id).await?;
        let model = self
            .storage
            .get_model(&conversation.model_id)
            .await?
            .ok_or_else(|| RapportError::not_found("model", &conversation.model_id))?;

        let user_message = Message::user(text);
        self.storage
            .append_message(conversation_id, &user_message)
            .await?;
        let mut history = conversation.messages;
        history.push(user_message.clone());

        let scores = score_sentiment(text);
        let decision = if find_no_go(text, &model.no_go_topics).is_some() {
            UpsellDecision::NoGoTopic
        } else {
            self.gate.evaluate(&history, &scores, self.rng.as_ref())
        };
        debug!(
            conversation_id,
            decision = %decision,
            excited = scores.excited,
            interested = scores.interested,
            hesitant = scores.hesitant,
            negative = scores.negative,
            "upsell gate evaluated"
        );

        if decision.is_approved()
            && let Some(item) = self.find_offer(&model.id, &history).await
        {
            let reply = Message::assistant(render_offer(&self.offer_template, &item));
            self.storage.append_message(conversation_id, &reply).await?;
            let transaction_id = match self
                .ledger
                .record_offer(&conversation.subscriber_id, &item)
                .await
            {
                Ok(txn) => Some(txn.id),
                Err(e) => {
                    warn!(conversation_id, content_id = %item.id, error = %e, "failed to record offer");
                    None
                }
            };
            info!(conversation_id, content_id = %item.id, price = item.price, "ppv offer sent");
            return Ok(TurnOutcome {
                user_message,
                reply,
                kind: ReplyKind::Offer {
                    content_id: item.id,
                    transaction_id,
                },
                decision,
            });
        }

        let ctx = ResponseContext::for_model(&model, history);
        let (kind, text) = match self.selector.select(&ctx).await? {
            Selection::Deflection(t) => (ReplyKind::Deflection, t),
            Selection::Generated(t) => (ReplyKind::Persona, t),
        };
        let reply = Message::assistant(text);
        self.storage.append_message(conversation_id, &reply).await?;

        Ok(TurnOutcome {
            user_message,
            reply,
            kind,
            decision,
        })
    }

    /// Matched content for the conversation tail, or `None` on lookup failure.
    async fn find_offer(&self, model_id: &str, history: &[Message]) -> Option<ContentItem> {
        let keywords = self.extractor.extract(history, &[]);
        match self.matcher.match_content(model_id, &keywords).await {
            Ok(item) => item,
            Err(e) => {
                warn!(model_id, error = %e, "content lookup failed, treating as no match");
                None
            }
        }
    }

    /// Create a conversation, optionally seeded with an assistant opening.
    pub async fn start_conversation(
        &self,
        subscriber_id: &str,
        model_id: &str,
        opening: Option<&str>,
    ) -> Result<Conversation, RapportError> {
        if self.storage.get_subscriber(subscriber_id).await?.is_none() {
            return Err(RapportError::not_found("subscriber", subscriber_id));
        }
        if self.storage.get_model(model_id).await?.is_none() {
            return Err(RapportError::not_found("model", model_id));
        }

        let mut conversation = Conversation::new(subscriber_id, model_id);
        if let Some(text) = opening {
            let message = Message::assistant(text);
            conversation.last_interaction = message.timestamp.clone();
            conversation.messages.push(message);
        }
        self.storage.insert_conversation(&conversation).await?;
        info!(
            conversation_id = %conversation.id,
            subscriber_id,
            model_id,
            "conversation started"
        );
        Ok(conversation)
    }

    /// Proactively open a conversation with a random opening line.
    ///
    /// Returns `None` for subscribers flagged do-not-message.
    pub async fn initiate_conversation(
        &self,
        subscriber_id: &str,
        model_id: &str,
    ) -> Result<Option<Conversation>, RapportError> {
        let subscriber = self
            .storage
            .get_subscriber(subscriber_id)
            .await?
            .ok_or_else(|| RapportError::not_found("subscriber", subscriber_id))?;
        if subscriber.do_not_message {
            info!(subscriber_id, "subscriber is do-not-message, not initiating");
            return Ok(None);
        }
        let opening = self.opening_line(Utc::now());
        self.start_conversation(subscriber_id, model_id, Some(&opening))
            .await
            .map(Some)
    }

    fn opening_line(&self, now: DateTime<Utc>) -> String {
        let line = OPENING_LINES[self.rng.pick(OPENING_LINES.len())];
        line.replace("{weekday}", &now.format("%A").to_string())
    }

    /// Whether a proactive offer is appropriate for this conversation at `now`.
    pub async fn ripe_for_proactive_offer(
        &self,
        conversation_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, RapportError> {
        let conversation = self.load(conversation_id).await?;
        Ok(self.gate.is_ripe_for_proactive(&conversation.messages, now))
    }

    /// Conversations of one subscriber, most recent interaction first.
    pub async fn conversations_for_subscriber(
        &self,
        subscriber_id: &str,
    ) -> Result<Vec<Conversation>, RapportError> {
        let filter = ConversationFilter {
            subscriber_id: Some(subscriber_id.to_string()),
            ..ConversationFilter::default()
        };
        self.storage.list_conversations(&filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rapport_config::model::StorageConfig;
    use rapport_core::{ContentType, Model, Role, Subscriber, TransactionFilter, TransactionType};
    use rapport_storage::{Database, SqliteStorage};

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn next_f64(&self) -> f64 {
            self.0
        }
    }

    struct Fixture {
        storage: Arc<dyn StorageAdapter>,
        engine: ConversationEngine,
        model: Model,
        subscriber: Subscriber,
    }

    async fn fixture(draw: f64) -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let storage: Arc<dyn StorageAdapter> =
            Arc::new(SqliteStorage::from_database(StorageConfig::default(), db));
        let mut model = Model::new("Mia");
        model.no_go_topics = vec!["money".into()];
        storage.insert_model(&model).await.unwrap();
        let subscriber = Subscriber::new("fan-1");
        storage.insert_subscriber(&subscriber).await.unwrap();

        let mut item = ContentItem::new(
            &model.id,
            "Beach Day",
            "https://cdn.example/beach.jpg",
            ContentType::Image,
            9.99,
        );
        item.tags = vec!["beach".into(), "bikini".into()];
        storage.insert_content(&item).await.unwrap();

        let engine = ConversationEngine::new(
            storage.clone(),
            Arc::new(Fixed(draw)),
            &RapportConfig::default(),
        );
        Fixture {
            storage,
            engine,
            model,
            subscriber,
        }
    }

    async fn warm_conversation(f: &Fixture) -> Conversation {
        let conv = f
            .engine
            .start_conversation(&f.subscriber.id, &f.model.id, Some("hi there"))
            .await
            .unwrap();
        f.storage
            .append_message(&conv.id, &Message::user("hello"))
            .await
            .unwrap();
        f.storage
            .append_message(&conv.id, &Message::assistant("how are you"))
            .await
            .unwrap();
        conv
    }

    #[test]
    fn offer_renders_title_and_price() {
        let item = ContentItem::new("m", "Sunset", "u", ContentType::Video, 12.5);
        let text = render_offer(&RapportConfig::default().upsell.offer_template, &item);
        assert!(text.contains("\"Sunset\""));
        assert!(text.contains("$12.50"));
        assert!(text.contains("PPV"));
    }

    #[tokio::test]
    async fn approved_turn_with_match_sends_offer_and_records_it() {
        let f = fixture(0.0).await;
        let conv = warm_conversation(&f).await;

        let outcome = f
            .engine
            .handle_user_message(&conv.id, "wow I love the beach")
            .await
            .unwrap();
        assert_eq!(outcome.decision, UpsellDecision::Approved);
        let ReplyKind::Offer {
            content_id,
            transaction_id,
        } = &outcome.kind
        else {
            panic!("expected an offer, got {:?}", outcome.kind);
        };
        assert!(transaction_id.is_some());
        assert!(outcome.reply.content.contains("Beach Day"));

        let txns = f
            .engine
            .ledger()
            .list(&TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].transaction_type, TransactionType::PpvSent);
        assert_eq!(txns[0].content_id.as_deref(), Some(content_id.as_str()));

        let stored = f.storage.get_conversation(&conv.id).await.unwrap().unwrap();
        assert_eq!(stored.messages.len(), 5);
        assert_eq!(stored.messages[3].role, Role::User);
        assert_eq!(stored.messages[4], outcome.reply);
    }

    #[tokio::test]
    async fn approved_turn_without_match_falls_back_to_persona() {
        let f = fixture(0.0).await;
        let conv = warm_conversation(&f).await;

        let outcome = f
            .engine
            .handle_user_message(&conv.id, "wow amazing day!")
            .await
            .unwrap();
        assert_eq!(outcome.decision, UpsellDecision::Approved);
        assert_eq!(outcome.kind, ReplyKind::Persona);
    }

    #[tokio::test]
    async fn dampened_turn_replies_in_persona() {
        let f = fixture(0.99).await;
        let conv = warm_conversation(&f).await;

        let outcome = f
            .engine
            .handle_user_message(&conv.id, "wow I love the beach")
            .await
            .unwrap();
        assert_eq!(outcome.decision, UpsellDecision::Dampened);
        assert_eq!(outcome.kind, ReplyKind::Persona);
    }

    #[tokio::test]
    async fn no_go_message_is_deflected() {
        let f = fixture(0.99).await;
        let conv = warm_conversation(&f).await;

        let outcome = f
            .engine
            .handle_user_message(&conv.id, "can I send you money")
            .await
            .unwrap();
        assert_eq!(outcome.kind, ReplyKind::Deflection);
        assert_eq!(
            outcome.reply.content,
            RapportConfig::default().persona.deflection
        );
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let f = fixture(0.0).await;
        let err = f
            .engine
            .handle_user_message("missing", "hello")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn initiate_refuses_do_not_message() {
        let f = fixture(0.0).await;
        let mut blocked = Subscriber::new("fan-2");
        blocked.do_not_message = true;
        f.storage.insert_subscriber(&blocked).await.unwrap();

        let none = f
            .engine
            .initiate_conversation(&blocked.id, &f.model.id)
            .await
            .unwrap();
        assert!(none.is_none());

        let conv = f
            .engine
            .initiate_conversation(&f.subscriber.id, &f.model.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].role, Role::Assistant);
        assert_eq!(conv.messages[0].content, OPENING_LINES[0]);

        let listed = f
            .engine
            .conversations_for_subscriber(&f.subscriber.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn opening_line_names_the_weekday() {
        let f = fixture(0.45).await;
        let monday = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(
            f.engine.opening_line(monday),
            "Happy Monday! How's your day going?"
        );
    }

    #[tokio::test]
    async fn fresh_conversation_is_not_ripe() {
        let f = fixture(0.0).await;
        let conv = warm_conversation(&f).await;
        assert!(
            !f.engine
                .ripe_for_proactive_offer(&conv.id, Utc::now())
                .await
                .unwrap()
        );
        f.storage
            .append_message(&conv.id, &Message::user("still here"))
            .await
            .unwrap();
        assert!(
            f.engine
                .ripe_for_proactive_offer(&conv.id, Utc::now())
                .await
                .unwrap()
        );
    }
}
