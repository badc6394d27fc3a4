// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content vault CRUD and tag lookup.

use rapport_core::{ContentItem, RapportError};
use rusqlite::{OptionalExtension, Row, params};

use super::{enum_column, json_column, to_json};
use crate::database::{Database, map_tr_err};

const COLUMNS: &str = "id, model_id, title, description, content_url, content_type, tags, \
                       price, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<ContentItem> {
    Ok(ContentItem {
        id: row.get(0)?,
        model_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        content_url: row.get(4)?,
        content_type: enum_column(row, 5)?,
        tags: json_column(row, 6)?,
        price: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub async fn insert_content(db: &Database, item: &ContentItem) -> Result<(), RapportError> {
    let tags = to_json(&item.tags)?;
    let item = item.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO content (id, model_id, title, description, content_url, content_type,
                 tags, price, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    item.id,
                    item.model_id,
                    item.title,
                    item.description,
                    item.content_url,
                    item.content_type.to_string(),
                    tags,
                    item.price,
                    item.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_content(db: &Database, id: &str) -> Result<Option<ContentItem>, RapportError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM content WHERE id = ?1"),
                params![id],
                from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// A model's content, oldest first with insertion order breaking ties.
pub async fn list_content(db: &Database, model_id: &str) -> Result<Vec<ContentItem>, RapportError> {
    let model_id = model_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM content WHERE model_id = ?1 ORDER BY created_at, rowid"
            ))?;
            let rows = stmt.query_map(params![model_id], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Content of `model_id` with at least one tag in `tags`, compared case-insensitively.
pub async fn find_by_tags(
    db: &Database,
    model_id: &str,
    tags: &[String],
) -> Result<Vec<ContentItem>, RapportError> {
    if tags.is_empty() {
        return Ok(Vec::new());
    }
    let model_id = model_id.to_string();
    let wanted: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
    let wanted = to_json(&wanted)?;
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM content c
                 WHERE c.model_id = ?1
                   AND EXISTS (
                       SELECT 1 FROM json_each(c.tags) t, json_each(?2) k
                       WHERE lower(t.value) = k.value
                   )
                 ORDER BY c.created_at, c.rowid"
            ))?;
            let rows = stmt.query_map(params![model_id, wanted], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn update_content(db: &Database, item: &ContentItem) -> Result<(), RapportError> {
    let tags = to_json(&item.tags)?;
    let item = item.clone();
    let id = item.id.clone();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE content SET title = ?2, description = ?3, content_url = ?4,
                 content_type = ?5, tags = ?6, price = ?7 WHERE id = ?1",
                params![
                    item.id,
                    item.title,
                    item.description,
                    item.content_url,
                    item.content_type.to_string(),
                    tags,
                    item.price,
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(RapportError::not_found("content", id));
    }
    Ok(())
}

pub async fn delete_content(db: &Database, id: &str) -> Result<bool, RapportError> {
    let id = id.to_string();
    let deleted = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM content WHERE id = ?1", params![id]))
        .await
        .map_err(map_tr_err)?;
    Ok(deleted > 0)
}
