// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscriber CRUD operations.

use rapport_core::{RapportError, Subscriber, SubscriberFilter, Transaction};
use rusqlite::{OptionalExtension, Row, params};

use super::enum_column;
use crate::database::{Database, map_tr_err};

const COLUMNS: &str = "id, external_id, name, tier, do_not_message, total_spent, \
                       last_purchase, created_at, updated_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Subscriber> {
    Ok(Subscriber {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        tier: enum_column(row, 3)?,
        do_not_message: row.get(4)?,
        total_spent: row.get(5)?,
        last_purchase: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub async fn insert_subscriber(db: &Database, sub: &Subscriber) -> Result<(), RapportError> {
    let sub = sub.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO subscribers (id, external_id, name, tier, do_not_message, total_spent,
                 last_purchase, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    sub.id,
                    sub.external_id,
                    sub.name,
                    sub.tier.to_string(),
                    sub.do_not_message,
                    sub.total_spent,
                    sub.last_purchase,
                    sub.created_at,
                    sub.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_subscriber(db: &Database, id: &str) -> Result<Option<Subscriber>, RapportError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM subscribers WHERE id = ?1"),
                params![id],
                from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Subscribers matching every set filter field, oldest first.
pub async fn list_subscribers(
    db: &Database,
    filter: &SubscriberFilter,
) -> Result<Vec<Subscriber>, RapportError> {
    let dnm = filter.do_not_message;
    let tier = filter.tier.map(|t| t.to_string());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM subscribers
                 WHERE (?1 IS NULL OR do_not_message = ?1)
                   AND (?2 IS NULL OR tier = ?2)
                 ORDER BY created_at, rowid"
            ))?;
            let rows = stmt.query_map(params![dnm, tier], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn update_subscriber(db: &Database, sub: &Subscriber) -> Result<(), RapportError> {
    let sub = sub.clone();
    let id = sub.id.clone();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE subscribers SET external_id = ?2, name = ?3, tier = ?4,
                 do_not_message = ?5, total_spent = ?6, last_purchase = ?7, updated_at = ?8
                 WHERE id = ?1",
                params![
                    sub.id,
                    sub.external_id,
                    sub.name,
                    sub.tier.to_string(),
                    sub.do_not_message,
                    sub.total_spent,
                    sub.last_purchase,
                    sub.updated_at,
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(RapportError::not_found("subscriber", id));
    }
    Ok(())
}

pub async fn delete_subscriber(db: &Database, id: &str) -> Result<bool, RapportError> {
    let id = id.to_string();
    let deleted = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM subscribers WHERE id = ?1", params![id]))
        .await
        .map_err(map_tr_err)?;
    Ok(deleted > 0)
}

/// Insert a spend transaction and bump the subscriber's totals in one
/// SQLite transaction.
pub async fn insert_spend(db: &Database, txn: &Transaction) -> Result<Subscriber, RapportError> {
    let txn = txn.clone();
    let subscriber_id = txn.subscriber_id.clone();
    let updated = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE subscribers SET total_spent = total_spent + ?2,
                 last_purchase = ?3, updated_at = ?3 WHERE id = ?1",
                params![txn.subscriber_id, txn.amount, txn.created_at],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            tx.execute(
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
            let sub = tx.query_row(
                &format!("SELECT {COLUMNS} FROM subscribers WHERE id = ?1"),
                params![txn.subscriber_id],
                from_row,
            )?;
            tx.commit()?;
            Ok(Some(sub))
        })
        .await
        .map_err(map_tr_err)?;
    updated.ok_or_else(|| RapportError::not_found("subscriber", subscriber_id))
}
