// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rapport - conversation engagement and upsell engine.
//!
//! This is the binary entry point for operators.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod chat;
mod manage;
mod revenue;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use rapport_config::model::RapportConfig;
use rapport_config::{ConfigError, render_errors};
use rapport_core::{RapportError, StorageAdapter};
use rapport_storage::SqliteStorage;
use tracing::warn;

/// Rapport - conversation engagement and upsell engine.
#[derive(Parser, Debug)]
#[command(name = "rapport", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat as a subscriber with a model persona.
    Chat {
        #[arg(long)]
        subscriber: String,
        #[arg(long)]
        model: String,
        /// Resume an existing conversation.
        #[arg(long)]
        conversation: Option<String>,
    },
    /// Proactively open a conversation with a subscriber.
    Initiate {
        #[arg(long)]
        subscriber: String,
        #[arg(long)]
        model: String,
    },
    /// Import historical DMs and learn the model's style.
    Import {
        #[arg(long)]
        model: String,
        /// CSV export or `Model:`/`User:` transcript.
        file: PathBuf,
        /// `csv` or `text`; inferred from the file extension when omitted.
        #[arg(long)]
        format: Option<rapport_import::ImportFormat>,
    },
    /// Manage model personas.
    #[command(subcommand)]
    Model(manage::ModelCommand),
    /// Manage subscribers.
    #[command(subcommand)]
    Subscriber(manage::SubscriberCommand),
    /// Manage PPV content.
    #[command(subcommand)]
    Content(manage::ContentCommand),
    /// Show revenue totals.
    Revenue(revenue::RevenueArgs),
}

fn load_config(path: Option<&std::path::Path>) -> Result<RapportConfig, Vec<ConfigError>> {
    match path {
        Some(path) => rapport_config::load_and_validate_path(path),
        None => rapport_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.general.log_level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: RapportConfig) -> Result<(), RapportError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

    let result = match command {
        Commands::Chat {
            subscriber,
            model,
            conversation,
        } => {
            chat::run_chat(
                &config,
                storage.clone(),
                &subscriber,
                &model,
                conversation.as_deref(),
            )
            .await
        }
        Commands::Initiate { subscriber, model } => {
            chat::run_initiate(&config, storage.clone(), &subscriber, &model).await
        }
        Commands::Import {
            model,
            file,
            format,
        } => manage::run_import(&config, storage.clone(), &model, &file, format).await,
        Commands::Model(cmd) => manage::run_model(&config, storage.clone(), cmd).await,
        Commands::Subscriber(cmd) => manage::run_subscriber(&config, storage.clone(), cmd).await,
        Commands::Content(cmd) => manage::run_content(&config, storage.clone(), cmd).await,
        Commands::Revenue(args) => revenue::run_revenue(storage.clone(), args).await,
    };

    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
    result
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rapport={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
