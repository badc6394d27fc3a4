// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Historical DM import.
//!
//! Turns exported message history into [`Message`] records ready for style
//! analysis. Two input shapes are understood: a CSV export with `sender`,
//! `message` and `timestamp` columns, and a plain transcript with one
//! `Model: ...` or `User: ...` line per message.

use std::io::Read;
use std::sync::LazyLock;

use rapport_core::{Message, RapportError, Role, now_timestamp};
use regex::Regex;
use serde::Deserialize;
use strum::{Display, EnumString};
use tracing::debug;

/// Transcript line: speaker label, colon, message body.
static TRANSCRIPT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(model|user):\s*(.*)$").expect("valid regex")
});

/// Supported import formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImportFormat {
    Csv,
    Text,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

fn import_err(
    message: impl Into<String>,
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> RapportError {
    RapportError::Import {
        message: message.into(),
        source: Some(source.into()),
    }
}

/// `model` (any case) is the persona; every other sender is the subscriber.
fn role_for_sender(sender: Option<&str>) -> Role {
    match sender {
        Some(s) if s.trim().eq_ignore_ascii_case("model") => Role::Assistant,
        _ => Role::User,
    }
}

/// Parse a CSV export. Header names are matched case-insensitively.
///
/// Rows without a message body, or that fail to decode, are skipped.
/// A missing or blank timestamp becomes the import time.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Message>, RapportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| import_err("unreadable CSV header", e))?
        .iter()
        .map(|h| h.to_lowercase())
        .collect::<csv::StringRecord>();
    if !headers.iter().any(|h| h == "message") {
        return Err(RapportError::Import {
            message: "CSV header has no `message` column".to_string(),
            source: None,
        });
    }
    rdr.set_headers(headers);

    let imported_at = now_timestamp();
    let mut messages = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.deserialize::<CsvRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                debug!(error = %e, "skipping undecodable CSV row");
                skipped += 1;
                continue;
            }
        };
        let Some(content) = row.message.filter(|m| !m.trim().is_empty()) else {
            skipped += 1;
            continue;
        };
        let timestamp = row
            .timestamp
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| imported_at.clone());
        messages.push(Message {
            role: role_for_sender(row.sender.as_deref()),
            content,
            timestamp,
        });
    }

    debug!(parsed = messages.len(), skipped, "CSV import parsed");
    Ok(messages)
}

/// Parse a plain transcript. Lines not starting with `Model:` or `User:` are dropped.
pub fn parse_transcript(text: &str) -> Vec<Message> {
    let imported_at = now_timestamp();
    let messages: Vec<Message> = text
        .lines()
        .filter_map(|line| {
            let caps = TRANSCRIPT_LINE.captures(line.trim_end_matches('\r'))?;
            let role = role_for_sender(caps.get(1).map(|m| m.as_str()));
            Some(Message {
                role,
                content: caps.get(2).map_or("", |m| m.as_str()).to_string(),
                timestamp: imported_at.clone(),
            })
        })
        .collect();
    debug!(parsed = messages.len(), "transcript import parsed");
    messages
}

/// Parse `input` in the given format.
pub fn parse(format: ImportFormat, input: &str) -> Result<Vec<Message>, RapportError> {
    match format {
        ImportFormat::Csv => parse_csv(input.as_bytes()),
        ImportFormat::Text => Ok(parse_transcript(input)),
    }
}
