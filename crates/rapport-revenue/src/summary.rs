// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Revenue aggregation over transaction lists.

use rapport_core::{Transaction, TransactionType};
use serde::Serialize;

/// Revenue totals by kind. Sent offers are counted, never summed.
///
/// A `ppv_sent` row records the price of an offer, not money received, so its
/// amount stays out of `total` and every bucket. Only `offers_sent` moves.
/// Ledgers that summed every row regardless of kind will report a higher
/// total than this for the same transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub total: f64,
    pub ppv: f64,
    pub tips: f64,
    pub subscriptions: f64,
    /// Revenue from kinds without a dedicated bucket.
    pub other: f64,
    /// Number of `ppv_sent` offers in the window.
    pub offers_sent: usize,
}

impl RevenueSummary {
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut summary = Self::default();
        for txn in transactions {
            summary.add(txn);
        }
        summary
    }

    fn add(&mut self, txn: &Transaction) {
        let bucket = match &txn.transaction_type {
            TransactionType::PpvSent => {
                self.offers_sent += 1;
                return;
            }
            TransactionType::Ppv => &mut self.ppv,
            TransactionType::Tip => &mut self.tips,
            TransactionType::Subscription => &mut self.subscriptions,
            TransactionType::Other(_) => &mut self.other,
        };
        *bucket += txn.amount;
        self.total += txn.amount;
    }
}
