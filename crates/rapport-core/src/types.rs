// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the storage, engine, catalog and revenue crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Timestamp layout used for every persisted timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time as a persisted timestamp string.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Formats a UTC time as a persisted timestamp string.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a persisted (or any RFC 3339) timestamp. Returns `None` when malformed.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Fresh UUID v4 identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Generator,
}

// --- Conversation types ---

/// Author of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    Assistant,
    User,
}

/// A single conversation message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

impl Message {
    /// Creates a message stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: now_timestamp(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A subscriber/model conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub subscriber_id: String,
    pub model_id: String,
    /// Messages in append order.
    pub messages: Vec<Message>,
    pub last_interaction: String,
    pub created_at: String,
}

impl Conversation {
    pub fn new(subscriber_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        let now = now_timestamp();
        Self {
            id: new_id(),
            subscriber_id: subscriber_id.into(),
            model_id: model_id.into(),
            messages: Vec::new(),
            last_interaction: now.clone(),
            created_at: now,
        }
    }
}

// --- Model (persona) types ---

/// Categorical level used by every style parameter.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    #[default]
    Low,
    Medium,
    High,
}

/// Messaging style learned from a model's historical DMs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub emoji_frequency: Level,
    pub flirt_level: Level,
    pub message_complexity: Level,
    /// Average words per assistant message in the analyzed batch.
    #[serde(default)]
    pub avg_message_length: f64,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Persona biography. Unknown keys survive round-trips through `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelBio {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

/// Persona preferences, including the derived style profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleProfile>,
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

/// Priced services a model offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelServices {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppv_base_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_requests: Option<bool>,
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

/// A model persona operated through the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub bio: ModelBio,
    pub preferences: ModelPreferences,
    pub services: ModelServices,
    /// Topics the persona deflects. Unique case-insensitively.
    pub no_go_topics: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_timestamp();
        Self {
            id: new_id(),
            name: name.into(),
            bio: ModelBio::default(),
            preferences: ModelPreferences::default(),
            services: ModelServices::default(),
            no_go_topics: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The learned style profile, if DMs were imported.
    pub fn style(&self) -> Option<&StyleProfile> {
        self.preferences.style.as_ref()
    }
}

// --- Subscriber types ---

/// Subscriber classification used for prioritization.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriberTier {
    #[default]
    Regular,
    Vip,
    Whale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: String,
    /// Identifier on the external platform.
    pub external_id: String,
    pub name: Option<String>,
    pub tier: SubscriberTier,
    /// Do-not-message: suppresses outbound automated messages.
    pub do_not_message: bool,
    pub total_spent: f64,
    pub last_purchase: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Subscriber {
    pub fn new(external_id: impl Into<String>) -> Self {
        let now = now_timestamp();
        Self {
            id: new_id(),
            external_id: external_id.into(),
            name: None,
            tier: SubscriberTier::default(),
            do_not_message: false,
            total_spent: 0.0,
            last_purchase: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Display name, falling back to the external identifier.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.external_id)
    }
}

// --- Content types ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentType {
    Image,
    Video,
    Audio,
}

/// A pay-per-view item in a model's vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub model_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Storage locator for the media.
    pub content_url: String,
    pub content_type: ContentType,
    pub tags: Vec<String>,
    pub price: f64,
    pub created_at: String,
}

impl ContentItem {
    pub fn new(
        model_id: impl Into<String>,
        title: impl Into<String>,
        content_url: impl Into<String>,
        content_type: ContentType,
        price: f64,
    ) -> Self {
        Self {
            id: new_id(),
            model_id: model_id.into(),
            title: title.into(),
            description: None,
            content_url: content_url.into(),
            content_type,
            tags: Vec::new(),
            price,
            created_at: now_timestamp(),
        }
    }
}

// --- Transaction types ---

/// Kind of monetizable event. Unknown kinds are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    /// A purchased pay-per-view item.
    Ppv,
    /// A pay-per-view offer sent in conversation.
    PpvSent,
    Tip,
    Subscription,
    Other(String),
}

impl TransactionType {
    /// Convert to string for storage.
    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Ppv => "ppv",
            TransactionType::PpvSent => "ppv_sent",
            TransactionType::Tip => "tip",
            TransactionType::Subscription => "subscription",
            TransactionType::Other(kind) => kind,
        }
    }

    /// Parse from a stored string.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "ppv" => TransactionType::Ppv,
            "ppv_sent" => TransactionType::PpvSent,
            "tip" => TransactionType::Tip,
            "subscription" => TransactionType::Subscription,
            other => TransactionType::Other(other.to_string()),
        }
    }

    /// Offers are records of intent, not money received.
    pub fn is_revenue(&self) -> bool {
        !matches!(self, TransactionType::PpvSent)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TransactionType {
    fn from(value: String) -> Self {
        Self::from_str_value(&value)
    }
}

impl From<TransactionType> for String {
    fn from(value: TransactionType) -> Self {
        value.as_str().to_string()
    }
}

/// A monetizable event. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub subscriber_id: String,
    pub model_id: String,
    pub content_id: Option<String>,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub external_transaction_id: Option<String>,
    pub created_at: String,
}

// --- Query filters ---

/// Equality filters for subscriber listing. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberFilter {
    pub do_not_message: Option<bool>,
    pub tier: Option<SubscriberTier>,
}

/// Equality filters for conversation listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationFilter {
    pub subscriber_id: Option<String>,
    pub model_id: Option<String>,
}

/// Filters for transaction listing. Time bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub subscriber_id: Option<String>,
    pub model_id: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
}

// --- Generation types ---

/// Everything a response generator may condition on.
#[derive(Debug, Clone, Default)]
pub struct ResponseContext {
    pub history: Vec<Message>,
    pub bio: ModelBio,
    pub style: Option<StyleProfile>,
    pub no_go_topics: Vec<String>,
}

impl ResponseContext {
    /// Builds a context from a model's persona fields and a conversation history.
    pub fn for_model(model: &Model, history: Vec<Message>) -> Self {
        Self {
            history,
            bio: model.bio.clone(),
            style: model.preferences.style.clone(),
            no_go_topics: model.no_go_topics.clone(),
        }
    }

    /// The most recent message authored by the subscriber.
    pub fn latest_user_message(&self) -> Option<&Message> {
        self.history.iter().rev().find(|m| m.role == Role::User)
    }
}
