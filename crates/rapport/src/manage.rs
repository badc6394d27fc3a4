// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator subcommands: models, subscribers, content and DM import.

use std::path::Path;
use std::sync::Arc;

use clap::Subcommand;
use colored::Colorize;
use rapport_catalog::{Catalog, NewContent};
use rapport_config::model::RapportConfig;
use rapport_core::{
    ContentType, Model, RapportError, StorageAdapter, SubscriberFilter, SubscriberTier,
};
use rapport_import::ImportFormat;

#[derive(Subcommand, Debug)]
pub enum ModelCommand {
    /// Create a model persona.
    Add { name: String },
    /// List all models.
    List,
    /// Show one model in full.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Add a topic the persona refuses to discuss.
    NoGoAdd { id: String, topic: String },
    /// Remove a no-go topic.
    NoGoRemove { id: String, topic: String },
}

#[derive(Subcommand, Debug)]
pub enum SubscriberCommand {
    /// Register a subscriber by platform id.
    Add {
        external_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "regular")]
        tier: SubscriberTier,
    },
    /// List subscribers.
    List {
        /// Only subscribers that may be messaged.
        #[arg(long)]
        eligible: bool,
    },
    /// Flag a subscriber do-not-message.
    Dnm {
        id: String,
        /// Clear the flag instead.
        #[arg(long)]
        off: bool,
    },
    /// Record a tip.
    Tip {
        id: String,
        #[arg(long)]
        model: String,
        amount: f64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContentCommand {
    /// Add a PPV item to a model's vault.
    Add {
        #[arg(long)]
        model: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
        #[arg(long = "type", default_value = "image")]
        content_type: ContentType,
        #[arg(long, default_value_t = 0.0)]
        price: f64,
        /// Matching tag; repeat for several.
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List a model's vault.
    List {
        #[arg(long)]
        model: String,
    },
    /// Delete a content item.
    Remove { id: String },
}

fn print_model_line(model: &Model) {
    let style = model
        .style()
        .map(|s| {
            format!(
                "emoji={} flirt={} complexity={}",
                s.emoji_frequency, s.flirt_level, s.message_complexity
            )
        })
        .unwrap_or_else(|| "no style yet".to_string());
    println!("{}  {}  {}", model.id.dimmed(), model.name.bold(), style);
}

pub async fn run_model(
    config: &RapportConfig,
    storage: Arc<dyn StorageAdapter>,
    cmd: ModelCommand,
) -> Result<(), RapportError> {
    let models = Catalog::new(storage, config).models;
    match cmd {
        ModelCommand::Add { name } => {
            let model = models.create(&name).await?;
            println!("{} model {}", "created".green(), model.id);
        }
        ModelCommand::List => {
            for model in models.list().await? {
                print_model_line(&model);
            }
        }
        ModelCommand::Show { id, json } => {
            let model = models.get(&id).await?;
            if json {
                let out = serde_json::to_string_pretty(&model)
                    .map_err(|e| RapportError::Internal(format!("failed to encode model: {e}")))?;
                println!("{out}");
            } else {
                print_model_line(&model);
                if !model.no_go_topics.is_empty() {
                    println!("  no-go: {}", model.no_go_topics.join(", "));
                }
            }
        }
        ModelCommand::NoGoAdd { id, topic } => {
            let model = models.add_no_go_topic(&id, &topic).await?;
            println!("no-go: {}", model.no_go_topics.join(", "));
        }
        ModelCommand::NoGoRemove { id, topic } => {
            let model = models.remove_no_go_topic(&id, &topic).await?;
            println!("no-go: {}", model.no_go_topics.join(", "));
        }
    }
    Ok(())
}

pub async fn run_subscriber(
    config: &RapportConfig,
    storage: Arc<dyn StorageAdapter>,
    cmd: SubscriberCommand,
) -> Result<(), RapportError> {
    let subscribers = Catalog::new(storage, config).subscribers;
    match cmd {
        SubscriberCommand::Add {
            external_id,
            name,
            tier,
        } => {
            let sub = subscribers.create(&external_id, name.as_deref(), tier).await?;
            println!("{} subscriber {}", "created".green(), sub.id);
        }
        SubscriberCommand::List { eligible } => {
            let subs = if eligible {
                subscribers.list_eligible().await?
            } else {
                subscribers.list(&SubscriberFilter::default()).await?
            };
            for sub in subs {
                let dnm = if sub.do_not_message { " [dnm]".red().to_string() } else { String::new() };
                println!(
                    "{}  {}  {}  ${:.2}{dnm}",
                    sub.id.dimmed(),
                    sub.label().bold(),
                    sub.tier,
                    sub.total_spent
                );
            }
        }
        SubscriberCommand::Dnm { id, off } => {
            let sub = subscribers.set_do_not_message(&id, !off).await?;
            println!("{}: do-not-message = {}", sub.label(), sub.do_not_message);
        }
        SubscriberCommand::Tip { id, model, amount } => {
            let receipt = subscribers.record_tip(&id, &model, amount).await?;
            println!(
                "{} ${amount:.2} from {} (lifetime ${:.2})",
                "tip recorded".green(),
                receipt.subscriber.label(),
                receipt.subscriber.total_spent
            );
        }
    }
    Ok(())
}

pub async fn run_content(
    config: &RapportConfig,
    storage: Arc<dyn StorageAdapter>,
    cmd: ContentCommand,
) -> Result<(), RapportError> {
    let content = Catalog::new(storage, config).content;
    match cmd {
        ContentCommand::Add {
            model,
            title,
            url,
            content_type,
            price,
            tags,
            description,
        } => {
            let item = content
                .add(
                    &model,
                    NewContent {
                        title,
                        description,
                        content_url: url,
                        content_type,
                        tags,
                        price,
                    },
                )
                .await?;
            println!("{} content {}", "added".green(), item.id);
        }
        ContentCommand::List { model } => {
            for item in content.list(&model).await? {
                println!(
                    "{}  {}  {}  ${:.2}  [{}]",
                    item.id.dimmed(),
                    item.title.bold(),
                    item.content_type,
                    item.price,
                    item.tags.join(", ")
                );
            }
        }
        ContentCommand::Remove { id } => {
            if content.delete(&id).await? {
                println!("{} content {id}", "removed".green());
            } else {
                return Err(RapportError::not_found("content", id));
            }
        }
    }
    Ok(())
}

/// `csv` for `.csv` files, `text` otherwise.
fn infer_format(path: &Path) -> ImportFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => ImportFormat::Csv,
        _ => ImportFormat::Text,
    }
}

pub async fn run_import(
    config: &RapportConfig,
    storage: Arc<dyn StorageAdapter>,
    model_id: &str,
    file: &Path,
    format: Option<ImportFormat>,
) -> Result<(), RapportError> {
    let input = std::fs::read_to_string(file).map_err(|e| RapportError::Import {
        message: format!("cannot read {}", file.display()),
        source: Some(Box::new(e)),
    })?;
    let format = format.unwrap_or_else(|| infer_format(file));
    let report = Catalog::new(storage, config)
        .models
        .import_text(model_id, format, &input)
        .await?;
    println!(
        "{} {} records ({} from the model)",
        "imported".green(),
        report.records,
        report.assistant_messages
    );
    println!(
        "style: emoji={} flirt={} complexity={} avg_words={:.1}",
        report.profile.emoji_frequency,
        report.profile.flirt_level,
        report.profile.message_complexity,
        report.profile.avg_message_length
    );
    Ok(())
}
