// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation and message log operations.
//!
//! Messages live in their own table keyed by `(conversation_id, seq)`.
//! Appends compute the next `seq` and bump `last_interaction` inside one
//! SQL transaction, so concurrent appends never overwrite each other.

use rapport_core::{Conversation, ConversationFilter, Message, RapportError};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::enum_column;
use crate::database::{Database, map_tr_err};

const COLUMNS: &str = "id, subscriber_id, model_id, last_interaction, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        subscriber_id: row.get(1)?,
        model_id: row.get(2)?,
        messages: Vec::new(),
        last_interaction: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn load_messages(conn: &Connection, conversation_id: &str) -> rusqlite::Result<Vec<Message>> {
    let mut stmt = conn.prepare_cached(
        "SELECT role, content, timestamp FROM messages
         WHERE conversation_id = ?1 ORDER BY seq",
    )?;
    let rows = stmt.query_map(params![conversation_id], |row| {
        Ok(Message {
            role: enum_column(row, 0)?,
            content: row.get(1)?,
            timestamp: row.get(2)?,
        })
    })?;
    rows.collect()
}

/// Insert a conversation together with any seed messages.
pub async fn insert_conversation(db: &Database, conv: &Conversation) -> Result<(), RapportError> {
    let conv = conv.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO conversations (id, subscriber_id, model_id, last_interaction, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    conv.id,
                    conv.subscriber_id,
                    conv.model_id,
                    conv.last_interaction,
                    conv.created_at,
                ],
            )?;
            for (seq, msg) in conv.messages.iter().enumerate() {
                tx.execute(
                    "INSERT INTO messages (conversation_id, seq, role, content, timestamp)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![conv.id, seq as i64, msg.role.to_string(), msg.content, msg.timestamp],
                )?;
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, RapportError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let conv = conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM conversations WHERE id = ?1"),
                    params![id],
                    from_row,
                )
                .optional()?;
            match conv {
                Some(mut conv) => {
                    conv.messages = load_messages(conn, &conv.id)?;
                    Ok(Some(conv))
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Conversations matching the filter, most recent interaction first.
pub async fn list_conversations(
    db: &Database,
    filter: &ConversationFilter,
) -> Result<Vec<Conversation>, RapportError> {
    let subscriber_id = filter.subscriber_id.clone();
    let model_id = filter.model_id.clone();
    db.connection()
        .call(move |conn| {
            let mut convs = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM conversations
                     WHERE (?1 IS NULL OR subscriber_id = ?1)
                       AND (?2 IS NULL OR model_id = ?2)
                     ORDER BY last_interaction DESC, rowid DESC"
                ))?;
                let rows = stmt.query_map(params![subscriber_id, model_id], from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            };
            for conv in &mut convs {
                conv.messages = load_messages(conn, &conv.id)?;
            }
            Ok(convs)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a conversation. Its messages cascade.
pub async fn delete_conversation(db: &Database, id: &str) -> Result<bool, RapportError> {
    let id = id.to_string();
    let deleted = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM conversations WHERE id = ?1", params![id]))
        .await
        .map_err(map_tr_err)?;
    Ok(deleted > 0)
}

/// Append a message and return the conversation's new length.
pub async fn append_message(
    db: &Database,
    conversation_id: &str,
    msg: &Message,
) -> Result<usize, RapportError> {
    let id = conversation_id.to_string();
    let msg = msg.clone();
    let len = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE conversations SET last_interaction = ?2 WHERE id = ?1",
                params![id, msg.timestamp],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let seq: i64 = tx.query_row(
                "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO messages (conversation_id, seq, role, content, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, seq, msg.role.to_string(), msg.content, msg.timestamp],
            )?;
            tx.commit()?;
            Ok(Some(seq as usize + 1))
        })
        .await
        .map_err(map_tr_err)?;
    len.ok_or_else(|| RapportError::not_found("conversation", conversation_id))
}
