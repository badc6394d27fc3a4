// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response generation seam.

use async_trait::async_trait;

use crate::error::RapportError;
use crate::types::ResponseContext;

/// Produces a persona reply for a conversation.
///
/// The built-in implementation picks from canned lines; a language-model
/// backend can be plugged in behind the same trait.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, ctx: &ResponseContext) -> Result<String, RapportError>;
}
