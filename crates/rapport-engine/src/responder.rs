// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona replies: no-go deflection and style-aware canned responses.

use std::sync::Arc;

use async_trait::async_trait;
use rapport_core::{Level, RandomSource, RapportError, ResponseContext, ResponseGenerator};
use tracing::debug;

const BASE_REPLIES: &[&str] = &[
    "I've been thinking about you recently...",
    "How's your day going?",
    "I just got done with a photoshoot and wanted to say hi",
    "You always know what to say to make me smile",
    "I'm feeling a bit lonely tonight",
];

const FLIRTY_REPLIES: &[&str] = &[
    "I just got out of the shower and I'm feeling a bit lonely...",
    "I have a special video for you that I think you'll really enjoy",
    "What are you wearing right now?",
    "I've got something special to show you if you're interested...",
];

const EMOJI_PALETTE: &[&str] = &["😘", "💋", "❤️", "😍", "🔥", "👀", "💦"];

/// Built-in generator picking from canned lines shaped by the style profile.
///
/// Missing style means medium flirt and low emoji use.
pub struct PersonaResponder {
    rng: Arc<dyn RandomSource>,
}

impl PersonaResponder {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }

    /// Candidate lines for the given style.
    pub fn candidates(&self, ctx: &ResponseContext) -> Vec<String> {
        let flirt = ctx.style.as_ref().map_or(Level::Medium, |s| s.flirt_level);
        let emoji = ctx.style.as_ref().map_or(Level::Low, |s| s.emoji_frequency);

        let mut lines: Vec<String> = BASE_REPLIES.iter().map(|s| s.to_string()).collect();
        if flirt == Level::High {
            lines.extend(FLIRTY_REPLIES.iter().map(|s| s.to_string()));
        }
        if emoji == Level::High {
            for line in &mut lines {
                let e = EMOJI_PALETTE[self.rng.pick(EMOJI_PALETTE.len())];
                line.push(' ');
                line.push_str(e);
            }
        }
        lines
    }
}

#[async_trait]
impl ResponseGenerator for PersonaResponder {
    async fn generate(&self, ctx: &ResponseContext) -> Result<String, RapportError> {
        let mut lines = self.candidates(ctx);
        let idx = self.rng.pick(lines.len());
        Ok(lines.swap_remove(idx))
    }
}

/// First no-go topic mentioned in `text`, compared case-insensitively.
pub fn find_no_go<'a>(text: &str, topics: &'a [String]) -> Option<&'a str> {
    let lower = text.to_lowercase();
    topics
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .find(|t| lower.contains(&t.to_lowercase()))
}

/// Outcome of reply selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The subscriber raised a no-go topic.
    Deflection(String),
    Generated(String),
}

impl Selection {
    pub fn text(&self) -> &str {
        match self {
            Selection::Deflection(t) | Selection::Generated(t) => t,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Selection::Deflection(t) | Selection::Generated(t) => t,
        }
    }
}

/// Enforces no-go topics before delegating to a [`ResponseGenerator`].
#[derive(Clone)]
pub struct ResponseSelector {
    generator: Arc<dyn ResponseGenerator>,
    deflection: String,
}

impl ResponseSelector {
    pub fn new(generator: Arc<dyn ResponseGenerator>, deflection: impl Into<String>) -> Self {
        Self {
            generator,
            deflection: deflection.into(),
        }
    }

    pub async fn select(&self, ctx: &ResponseContext) -> Result<Selection, RapportError> {
        if let Some(msg) = ctx.latest_user_message()
            && let Some(topic) = find_no_go(&msg.content, &ctx.no_go_topics)
        {
            debug!(topic, "deflecting no-go topic");
            return Ok(Selection::Deflection(self.deflection.clone()));
        }
        let text = self.generator.generate(ctx).await?;
        Ok(Selection::Generated(text))
    }
}
