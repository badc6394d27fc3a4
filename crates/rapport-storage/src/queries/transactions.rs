// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only transaction ledger.

use rapport_core::{RapportError, Transaction, TransactionFilter, TransactionType};
use rusqlite::{Row, params};

use crate::database::{Database, map_tr_err};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(4)?;
    Ok(Transaction {
        id: row.get(0)?,
        subscriber_id: row.get(1)?,
        model_id: row.get(2)?,
        content_id: row.get(3)?,
        transaction_type: TransactionType::from_str_value(&kind),
        amount: row.get(5)?,
        external_transaction_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub async fn insert_transaction(db: &Database, txn: &Transaction) -> Result<(), RapportError> {
    let txn = txn.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO transactions (id, subscriber_id, model_id, content_id, transaction_type,
                 amount, external_transaction_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    txn.id,
                    txn.subscriber_id,
                    txn.model_id,
                    txn.content_id,
                    txn.transaction_type.as_str(),
                    txn.amount,
                    txn.external_transaction_id,
                    txn.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Transactions matching the filter, newest first. Time bounds are inclusive.
pub async fn list_transactions(
    db: &Database,
    filter: &TransactionFilter,
) -> Result<Vec<Transaction>, RapportError> {
    let filter = filter.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, subscriber_id, model_id, content_id, transaction_type, amount,
                 external_transaction_id, created_at
                 FROM transactions
                 WHERE (?1 IS NULL OR subscriber_id = ?1)
                   AND (?2 IS NULL OR model_id = ?2)
                   AND (?3 IS NULL OR created_at >= ?3)
                   AND (?4 IS NULL OR created_at <= ?4)
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt.query_map(
                params![filter.subscriber_id, filter.model_id, filter.since, filter.until],
                from_row,
            )?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
