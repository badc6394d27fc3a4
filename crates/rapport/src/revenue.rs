// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rapport revenue` command implementation.

use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use rapport_core::{RapportError, StorageAdapter};
use rapport_revenue::{Ledger, RevenueSummary};

#[derive(Args, Debug)]
pub struct RevenueArgs {
    /// Restrict to one model.
    #[arg(long)]
    pub model: Option<String>,
    /// Inclusive start timestamp (RFC 3339).
    #[arg(long, requires = "until")]
    pub since: Option<String>,
    /// Inclusive end timestamp (RFC 3339).
    #[arg(long, requires = "since")]
    pub until: Option<String>,
    /// Output structured JSON.
    #[arg(long)]
    pub json: bool,
}

fn print_summary(summary: &RevenueSummary) {
    println!("{}", "revenue".bold());
    println!("  total          ${:.2}", summary.total);
    println!("  ppv            ${:.2}", summary.ppv);
    println!("  tips           ${:.2}", summary.tips);
    println!("  subscriptions  ${:.2}", summary.subscriptions);
    println!("  other          ${:.2}", summary.other);
    println!("{}", format!("  offers sent    {}", summary.offers_sent).dimmed());
}

pub async fn run_revenue(
    storage: Arc<dyn StorageAdapter>,
    args: RevenueArgs,
) -> Result<(), RapportError> {
    let ledger = Ledger::new(storage);
    let summary = match (&args.since, &args.until) {
        (Some(since), Some(until)) => {
            ledger
                .summary_between(since, until, args.model.as_deref())
                .await?
        }
        _ => ledger.summary(args.model.as_deref()).await?,
    };

    if args.json {
        let out = serde_json::to_string_pretty(&summary)
            .map_err(|e| RapportError::Internal(format!("failed to encode summary: {e}")))?;
        println!("{out}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}
