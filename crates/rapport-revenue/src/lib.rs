// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transaction ledger and revenue reporting.
//!
//! This crate provides:
//! - **Ledger**: records tips, purchases and sent offers with a local external reference
//! - **Revenue summary**: totals per transaction kind, excluding offers that were only sent

pub mod ledger;
pub mod summary;

pub use ledger::Ledger;
pub use summary::RevenueSummary;
