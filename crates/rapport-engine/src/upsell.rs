// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upsell gate: decides whether a conversation turn may carry a PPV offer.
//!
//! Three deterministic gates run in order (depth, sentiment, cooldown).
//! Only when all pass is the random dampener consulted, so blocked turns
//! never consume randomness.

use chrono::{DateTime, Duration, Utc};
use rapport_config::model::UpsellConfig;
use rapport_core::{Message, RandomSource, Role, parse_timestamp};
use strum::Display;

use crate::sentiment::SentimentScores;

/// Messages considered by the proactive recency check.
const PROACTIVE_TAIL: usize = 3;

/// Which gate decided the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum UpsellDecision {
    /// History shorter than the minimum depth.
    TooEarly,
    /// Too negative, too hesitant, or not engaged.
    SentimentBlocked,
    /// An offer was made too recently.
    CoolingDown,
    /// Every gate passed but the random draw declined.
    Dampened,
    /// The message raised one of the model's no-go topics. The gates are
    /// not consulted and the persona deflects.
    NoGoTopic,
    Approved,
}

impl UpsellDecision {
    pub fn is_approved(self) -> bool {
        self == UpsellDecision::Approved
    }
}

#[derive(Debug, Clone)]
pub struct UpsellGate {
    config: UpsellConfig,
}

impl UpsellGate {
    pub fn new(config: UpsellConfig) -> Self {
        Self { config }
    }

    /// Evaluate the gates for `history`, where `scores` rate the triggering message.
    pub fn evaluate(
        &self,
        history: &[Message],
        scores: &SentimentScores,
        rng: &dyn RandomSource,
    ) -> UpsellDecision {
        if history.len() < self.config.min_messages {
            return UpsellDecision::TooEarly;
        }
        if scores.negative > self.config.max_negative
            || scores.hesitant > self.config.max_hesitant
            || !scores.is_engaged()
        {
            return UpsellDecision::SentimentBlocked;
        }
        if let Some(since) = self.messages_since_last_offer(history)
            && since < self.config.cooldown_messages
        {
            return UpsellDecision::CoolingDown;
        }
        if rng.next_f64() < self.config.approval_probability {
            UpsellDecision::Approved
        } else {
            UpsellDecision::Dampened
        }
    }

    /// Messages from the most recent offer to the end of history, offer included.
    ///
    /// The offer counts toward the cooldown window, so a window of 8 is
    /// cleared by the offer plus 7 subsequent messages.
    pub fn messages_since_last_offer(&self, history: &[Message]) -> Option<usize> {
        history
            .iter()
            .rposition(|m| m.role == Role::Assistant && m.content.contains(&self.config.marker))
            .map(|idx| history.len() - idx)
    }

    /// Proactive offers need conversational depth and a live exchange: the
    /// last three messages must all be newer than the recency window.
    pub fn is_ripe_for_proactive(&self, history: &[Message], now: DateTime<Utc>) -> bool {
        if history.len() < self.config.min_messages {
            return false;
        }
        let cutoff = now - Duration::minutes(self.config.recent_window_minutes);
        history[history.len() - PROACTIVE_TAIL.min(history.len())..]
            .iter()
            .all(|m| parse_timestamp(&m.timestamp).is_some_and(|at| at > cutoff))
    }
}

impl Default for UpsellGate {
    fn default() -> Self {
        Self::new(UpsellConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapport_core::format_timestamp;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts draws so tests can assert randomness was not consumed.
    struct CountingRandom {
        value: f64,
        draws: AtomicUsize,
    }

    impl CountingRandom {
        fn new(value: f64) -> Self {
            Self {
                value,
                draws: AtomicUsize::new(0),
            }
        }

        fn draws(&self) -> usize {
            self.draws.load(Ordering::SeqCst)
        }
    }

    impl RandomSource for CountingRandom {
        fn next_f64(&self) -> f64 {
            self.draws.fetch_add(1, Ordering::SeqCst);
            self.value
        }
    }

    fn engaged() -> SentimentScores {
        SentimentScores {
            excited: 1,
            ..SentimentScores::default()
        }
    }

    fn chatter(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("user {i}"))
                } else {
                    Message::assistant(format!("reply {i}"))
                }
            })
            .collect()
    }

    #[test]
    fn too_early_below_four_messages() {
        let gate = UpsellGate::default();
        let rng = CountingRandom::new(0.0);
        for n in 0..4 {
            assert_eq!(
                gate.evaluate(&chatter(n), &engaged(), &rng),
                UpsellDecision::TooEarly
            );
        }
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn unengaged_short_history_never_draws() {
        let gate = UpsellGate::default();
        let rng = CountingRandom::new(0.0);
        let decision = gate.evaluate(&chatter(3), &SentimentScores::default(), &rng);
        assert!(!decision.is_approved());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn sentiment_blocks_negative_hesitant_and_flat() {
        let gate = UpsellGate::default();
        let rng = CountingRandom::new(0.0);
        let history = chatter(6);

        let negative = SentimentScores {
            negative: 2,
            ..engaged()
        };
        let hesitant = SentimentScores {
            hesitant: 3,
            ..engaged()
        };
        for scores in [negative, hesitant, SentimentScores::default()] {
            assert_eq!(
                gate.evaluate(&history, &scores, &rng),
                UpsellDecision::SentimentBlocked
            );
        }
        assert_eq!(rng.draws(), 0);

        // At the limits the turn is still admissible.
        let borderline = SentimentScores {
            negative: 1,
            hesitant: 2,
            interested: 1,
            ..SentimentScores::default()
        };
        assert_eq!(
            gate.evaluate(&history, &borderline, &rng),
            UpsellDecision::Approved
        );
    }

    #[test]
    fn cooldown_window_includes_the_offer_itself() {
        let gate = UpsellGate::default();
        let rng = CountingRandom::new(0.0);

        let mut history = chatter(4);
        history.push(Message::assistant("Unlock this PPV?"));
        history.extend(chatter(6));
        // Offer plus 6 later messages: 7 of the 8-message window.
        assert_eq!(gate.messages_since_last_offer(&history), Some(7));
        assert_eq!(
            gate.evaluate(&history, &engaged(), &rng),
            UpsellDecision::CoolingDown
        );
        assert_eq!(rng.draws(), 0);

        // The 7th message after the offer clears it.
        history.push(Message::user("wow"));
        assert_eq!(gate.messages_since_last_offer(&history), Some(8));
        assert_eq!(
            gate.evaluate(&history, &engaged(), &rng),
            UpsellDecision::Approved
        );
    }

    #[test]
    fn marker_in_user_message_is_ignored() {
        let gate = UpsellGate::default();
        let mut history = chatter(5);
        history.push(Message::user("send me a PPV"));
        assert_eq!(gate.messages_since_last_offer(&history), None);
    }

    #[test]
    fn dampener_approves_below_probability() {
        let gate = UpsellGate::default();
        let history = chatter(6);
        assert_eq!(
            gate.evaluate(&history, &engaged(), &CountingRandom::new(0.29)),
            UpsellDecision::Approved
        );
        assert_eq!(
            gate.evaluate(&history, &engaged(), &CountingRandom::new(0.3)),
            UpsellDecision::Dampened
        );
    }

    #[test]
    fn proactive_requires_depth_and_recent_tail() {
        let gate = UpsellGate::default();
        let now = Utc::now();
        let at = |mins: i64| format_timestamp(now - Duration::minutes(mins));

        let mut history = chatter(4);
        for (m, mins) in history.iter_mut().zip([300, 50, 30, 10]) {
            m.timestamp = at(mins);
        }
        assert!(gate.is_ripe_for_proactive(&history, now));

        history[1].timestamp = at(61);
        assert!(!gate.is_ripe_for_proactive(&history, now));

        let mut short = chatter(3);
        for m in &mut short {
            m.timestamp = at(1);
        }
        assert!(!gate.is_ripe_for_proactive(&short, now));
    }

    #[test]
    fn unparseable_timestamps_are_not_recent() {
        let gate = UpsellGate::default();
        let mut history = chatter(4);
        history[3].timestamp = "last tuesday".into();
        assert!(!gate.is_ripe_for_proactive(&history, Utc::now()));
    }

    #[test]
    fn decision_display_is_snake_case() {
        assert_eq!(UpsellDecision::CoolingDown.to_string(), "cooling_down");
        assert_eq!(UpsellDecision::Approved.to_string(), "approved");
        assert_eq!(UpsellDecision::NoGoTopic.to_string(), "no_go_topic");
    }
}
