// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per collection.
//!
//! Each function takes `&Database` and runs its statements inside a single
//! `call()` on the writer thread.

pub mod content;
pub mod conversations;
pub mod models;
pub mod subscribers;
pub mod transactions;

use std::str::FromStr;

use rapport_core::RapportError;
use rusqlite::Row;
use rusqlite::types::Type;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Serialize a value for a JSON text column.
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, RapportError> {
    serde_json::to_string(value).map_err(RapportError::storage)
}

/// Read a JSON text column.
pub(crate) fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a text column holding a `FromStr` enum.
pub(crate) fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
