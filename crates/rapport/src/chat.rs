// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rapport chat` and `rapport initiate` command implementations.
//!
//! `chat` launches an interactive REPL where the operator types as the
//! subscriber and the engine answers as the model persona. Offers and
//! deflections are highlighted so the upsell decisions are visible.

use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;
use rapport_config::model::RapportConfig;
use rapport_core::{Conversation, RapportError, Role, StorageAdapter};
use rapport_engine::{ConversationEngine, ReplyKind, TurnOutcome, random_source};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

fn engine(config: &RapportConfig, storage: Arc<dyn StorageAdapter>) -> ConversationEngine {
    ConversationEngine::new(storage, random_source(config.persona.seed), config)
}

fn print_reply(outcome: &TurnOutcome) {
    match &outcome.kind {
        ReplyKind::Offer { content_id, .. } => {
            println!("{} {}", "model>".magenta().bold(), outcome.reply.content.bold());
            println!("{}", format!("  [offer sent: {content_id}]").dimmed());
        }
        ReplyKind::Deflection => {
            println!("{} {}", "model>".magenta().bold(), outcome.reply.content.yellow());
        }
        ReplyKind::Persona => {
            println!("{} {}", "model>".magenta().bold(), outcome.reply.content);
        }
    }
}

fn print_history(conversation: &Conversation) {
    for message in &conversation.messages {
        match message.role {
            Role::User => println!("{} {}", "you>".cyan(), message.content),
            Role::Assistant => println!("{} {}", "model>".magenta().bold(), message.content),
            Role::System => println!("{}", message.content.dimmed()),
        }
    }
}

/// Runs the `rapport chat` interactive REPL.
pub async fn run_chat(
    config: &RapportConfig,
    storage: Arc<dyn StorageAdapter>,
    subscriber_id: &str,
    model_id: &str,
    conversation_id: Option<&str>,
) -> Result<(), RapportError> {
    let engine = engine(config, storage.clone());

    let conversation = match conversation_id {
        Some(id) => storage
            .get_conversation(id)
            .await?
            .ok_or_else(|| RapportError::not_found("conversation", id))?,
        None => {
            engine
                .start_conversation(subscriber_id, model_id, None)
                .await?
        }
    };

    let mut rl = DefaultEditor::new()
        .map_err(|e| RapportError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "rapport chat".bold().green());
    println!("conversation {}", conversation.id.dimmed());
    println!(
        "Type {} to exit, {} to check proactive readiness.\n",
        "/quit".yellow(),
        "/ripe".yellow()
    );
    print_history(&conversation);

    let prompt = format!("{} ", "you>".cyan());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if trimmed == "/ripe" {
                    match engine
                        .ripe_for_proactive_offer(&conversation.id, Utc::now())
                        .await
                    {
                        Ok(ripe) => println!("{}", format!("ripe for proactive offer: {ripe}").dimmed()),
                        Err(e) => eprintln!("{}: {e}", "error".red()),
                    }
                    continue;
                }

                match engine.handle_user_message(&conversation.id, trimmed).await {
                    Ok(outcome) => {
                        debug!(decision = %outcome.decision, "turn complete");
                        print_reply(&outcome);
                    }
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", format!("conversation saved: {}", conversation.id).dimmed());
    Ok(())
}

/// Runs `rapport initiate`.
pub async fn run_initiate(
    config: &RapportConfig,
    storage: Arc<dyn StorageAdapter>,
    subscriber_id: &str,
    model_id: &str,
) -> Result<(), RapportError> {
    let engine = engine(config, storage);
    match engine.initiate_conversation(subscriber_id, model_id).await? {
        Some(conversation) => {
            println!("conversation {}", conversation.id);
            print_history(&conversation);
        }
        None => {
            println!(
                "{}",
                "subscriber is flagged do-not-message; no conversation started".yellow()
            );
        }
    }
    Ok(())
}
