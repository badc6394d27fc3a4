// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword extraction from recent conversation turns.

use std::collections::BTreeSet;

use rapport_config::model::MatchingConfig;
use rapport_core::Message;

/// Pulls candidate content tags out of the tail of a conversation.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    recent_messages: usize,
    min_chars: usize,
}

impl KeywordExtractor {
    pub fn new(recent_messages: usize, min_chars: usize) -> Self {
        Self {
            recent_messages,
            min_chars,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.recent_messages, config.min_keyword_chars)
    }

    /// Lowercased whitespace tokens of at least `min_chars` characters from
    /// the last `recent_messages` messages, unioned with `supplied`.
    pub fn extract(&self, history: &[Message], supplied: &[String]) -> BTreeSet<String> {
        let start = history.len().saturating_sub(self.recent_messages);
        let mut keywords: BTreeSet<String> = history[start..]
            .iter()
            .flat_map(|m| {
                m.content
                    .to_lowercase()
                    .split_whitespace()
                    .filter(|w| w.chars().count() >= self.min_chars)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        keywords.extend(supplied.iter().map(|k| k.to_lowercase()));
        keywords
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::from_config(&MatchingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_last_three_messages_count() {
        let history = vec![
            Message::user("ancient beach photos"),
            Message::assistant("hello there"),
            Message::user("show me lingerie"),
            Message::assistant("maybe later"),
        ];
        let kw = KeywordExtractor::default().extract(&history, &[]);
        assert!(!kw.contains("beach"));
        assert!(kw.contains("lingerie"));
        assert!(kw.contains("there"));
        assert!(kw.contains("show"));
        assert!(kw.contains("maybe"));
        // Three characters is too short.
        assert!(!kw.contains("me"));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let kw = KeywordExtractor::default().extract(&[Message::user("día café")], &[]);
        assert!(kw.contains("café"));
        assert!(!kw.contains("día"));
    }

    #[test]
    fn supplied_keywords_are_lowercased_and_merged() {
        let kw = KeywordExtractor::default()
            .extract(&[Message::user("Beach")], &["Gym".to_string(), "beach".to_string()]);
        assert_eq!(kw.into_iter().collect::<Vec<_>>(), vec!["beach", "gym"]);
    }

    #[test]
    fn empty_history_and_no_supplied_is_empty() {
        assert!(KeywordExtractor::default().extract(&[], &[]).is_empty());
    }
}
