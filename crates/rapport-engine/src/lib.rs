// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engagement and upsell heuristics for Rapport conversations.
//!
//! This crate provides:
//! - [`score_sentiment`]: Keyword sentiment scoring per subscriber message
//! - [`UpsellGate`]: Depth, sentiment, cooldown and dampener gates for PPV offers
//! - [`KeywordExtractor`] and [`ContentMatcher`]: Conversation-to-vault matching
//! - [`StyleAnalyzer`]: Style profile extraction from historical persona messages
//! - [`ResponseSelector`] and [`PersonaResponder`]: No-go deflection and persona replies
//! - [`ConversationEngine`]: One-turn orchestration over storage and the ledger

pub mod keywords;
pub mod matcher;
pub mod orchestrator;
pub mod random;
pub mod responder;
pub mod sentiment;
pub mod style;
pub mod upsell;

pub use keywords::KeywordExtractor;
pub use matcher::ContentMatcher;
pub use orchestrator::{ConversationEngine, ReplyKind, TurnOutcome, render_offer};
pub use random::{SeededRandom, ThreadRandom, random_source};
pub use responder::{PersonaResponder, ResponseSelector, Selection, find_no_go};
pub use sentiment::{SentimentScores, score_sentiment};
pub use style::{StyleAnalyzer, StyleStats};
pub use upsell::{UpsellDecision, UpsellGate};
