// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model persona CRUD operations.

use rapport_core::{Model, RapportError};
use rusqlite::{OptionalExtension, Row, params};

use super::{json_column, to_json};
use crate::database::{Database, map_tr_err};

const COLUMNS: &str =
    "id, name, bio, preferences, services, no_go_topics, created_at, updated_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Model> {
    Ok(Model {
        id: row.get(0)?,
        name: row.get(1)?,
        bio: json_column(row, 2)?,
        preferences: json_column(row, 3)?,
        services: json_column(row, 4)?,
        no_go_topics: json_column(row, 5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Serialized JSON columns of a model, computed before entering the writer thread.
struct JsonColumns {
    bio: String,
    preferences: String,
    services: String,
    no_go_topics: String,
}

impl JsonColumns {
    fn of(model: &Model) -> Result<Self, RapportError> {
        Ok(Self {
            bio: to_json(&model.bio)?,
            preferences: to_json(&model.preferences)?,
            services: to_json(&model.services)?,
            no_go_topics: to_json(&model.no_go_topics)?,
        })
    }
}

pub async fn insert_model(db: &Database, model: &Model) -> Result<(), RapportError> {
    let json = JsonColumns::of(model)?;
    let model = model.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO models (id, name, bio, preferences, services, no_go_topics, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    model.id,
                    model.name,
                    json.bio,
                    json.preferences,
                    json.services,
                    json.no_go_topics,
                    model.created_at,
                    model.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_model(db: &Database, id: &str) -> Result<Option<Model>, RapportError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM models WHERE id = ?1"),
                params![id],
                from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All models, oldest first.
pub async fn list_models(db: &Database) -> Result<Vec<Model>, RapportError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM models ORDER BY created_at, rowid"))?;
            let rows = stmt.query_map([], from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Replace every mutable column of an existing model.
pub async fn update_model(db: &Database, model: &Model) -> Result<(), RapportError> {
    let json = JsonColumns::of(model)?;
    let model = model.clone();
    let id = model.id.clone();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE models SET name = ?2, bio = ?3, preferences = ?4, services = ?5,
                 no_go_topics = ?6, updated_at = ?7 WHERE id = ?1",
                params![
                    model.id,
                    model.name,
                    json.bio,
                    json.preferences,
                    json.services,
                    json.no_go_topics,
                    model.updated_at,
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(RapportError::not_found("model", id));
    }
    Ok(())
}

pub async fn delete_model(db: &Database, id: &str) -> Result<bool, RapportError> {
    let id = id.to_string();
    let deleted = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM models WHERE id = ?1", params![id]))
        .await
        .map_err(map_tr_err)?;
    Ok(deleted > 0)
}
