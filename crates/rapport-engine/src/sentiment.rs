// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword sentiment scoring for subscriber messages.
//!
//! Four independent categories, each counting how many of its keywords occur
//! as case-insensitive substrings. A keyword may score in more than one
//! category ("expensive" is both hesitant and negative).

use serde::Serialize;

const EXCITED: &[&str] = &["wow", "amazing", "awesome", "yes", "please", "love", "!", "😍", "🔥"];

const INTERESTED: &[&str] = &["what", "how", "tell", "show", "more", "?", "interested", "curious"];

const HESITANT: &[&str] = &[
    "maybe",
    "idk",
    "i don't know",
    "not sure",
    "expensive",
    "cost",
    "later",
];

const NEGATIVE: &[&str] = &["no", "don't", "won't", "can't", "expensive", "too much"];

/// Per-category keyword hit counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentScores {
    pub excited: u32,
    pub interested: u32,
    pub hesitant: u32,
    pub negative: u32,
}

impl SentimentScores {
    /// True when the message shows any excitement or interest.
    pub fn is_engaged(&self) -> bool {
        self.excited >= 1 || self.interested >= 1
    }
}

fn count_hits(haystack: &str, keywords: &[&str]) -> u32 {
    keywords.iter().filter(|k| haystack.contains(*k)).count() as u32
}

/// Score a message. Pure and deterministic.
pub fn score_sentiment(message: &str) -> SentimentScores {
    let lower = message.to_lowercase();
    SentimentScores {
        excited: count_hits(&lower, EXCITED),
        interested: count_hits(&lower, INTERESTED),
        hesitant: count_hits(&lower, HESITANT),
        negative: count_hits(&lower, NEGATIVE),
    }
}
