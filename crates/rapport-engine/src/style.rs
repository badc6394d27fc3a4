// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Style profile extraction from a model's historical DMs.
//!
//! Only the model's own (`assistant`) messages count. Three ratios are
//! measured and bucketed into [`Level`]s using strict `>` thresholds.

use rapport_config::model::StyleConfig;
use rapport_core::{Level, Message, Role, StyleProfile};

const FLIRTY_PHRASES: &[&str] = &[
    "babe",
    "sexy",
    "hot",
    "love",
    "miss",
    "kiss",
    "touch",
    "feel",
    "body",
    "special",
    "private",
    "just for you",
    "thinking of you",
];

/// Code point ranges counted as emoji.
const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F),
    (0x1F300, 0x1F5FF),
    (0x1F680, 0x1F6FF),
    (0x2600, 0x26FF),
    (0x2700, 0x27BF),
];

fn is_emoji(c: char) -> bool {
    let cp = c as u32;
    EMOJI_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Raw measurements behind a [`StyleProfile`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StyleStats {
    pub assistant_messages: usize,
    /// Emoji code points per message.
    pub emoji_ratio: f64,
    /// Distinct flirty phrases present, summed over messages, per message.
    pub flirt_ratio: f64,
    /// Whitespace-separated words per message.
    pub avg_words: f64,
}

#[derive(Debug, Clone)]
pub struct StyleAnalyzer {
    config: StyleConfig,
}

impl StyleAnalyzer {
    pub fn new(config: StyleConfig) -> Self {
        Self { config }
    }

    pub fn measure(&self, messages: &[Message]) -> StyleStats {
        let mut count = 0usize;
        let mut emoji = 0usize;
        let mut flirty = 0usize;
        let mut words = 0usize;

        for msg in messages.iter().filter(|m| m.role == Role::Assistant) {
            count += 1;
            words += msg.content.split_whitespace().count();
            emoji += msg.content.chars().filter(|c| is_emoji(*c)).count();
            let lower = msg.content.to_lowercase();
            flirty += FLIRTY_PHRASES.iter().filter(|p| lower.contains(*p)).count();
        }

        if count == 0 {
            return StyleStats::default();
        }
        let n = count as f64;
        StyleStats {
            assistant_messages: count,
            emoji_ratio: emoji as f64 / n,
            flirt_ratio: flirty as f64 / n,
            avg_words: words as f64 / n,
        }
    }

    /// Profile for `messages`. `last_updated` is left for the caller to stamp.
    pub fn analyze(&self, messages: &[Message]) -> StyleProfile {
        let stats = self.measure(messages);
        let c = &self.config;
        StyleProfile {
            emoji_frequency: bucket(stats.emoji_ratio, c.emoji_medium, c.emoji_high),
            flirt_level: bucket(stats.flirt_ratio, c.flirt_medium, c.flirt_high),
            message_complexity: bucket(stats.avg_words, c.complexity_medium, c.complexity_high),
            avg_message_length: stats.avg_words,
            last_updated: None,
        }
    }
}

impl Default for StyleAnalyzer {
    fn default() -> Self {
        Self::new(StyleConfig::default())
    }
}

fn bucket(value: f64, medium: f64, high: f64) -> Level {
    if value > high {
        Level::High
    } else if value > medium {
        Level::Medium
    } else {
        Level::Low
    }
}
