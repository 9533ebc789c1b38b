//! services/api/src/adapters/normalize.rs
//!
//! Defensive normalization of stored documents at the persistence boundary.
//!
//! Documents written by earlier versions of the save path can miss fields or
//! carry timestamps in several legacy shapes (RFC 3339 strings, epoch
//! seconds, epoch milliseconds, `{"seconds": …}` objects). Everything is
//! coalesced here, once, so downstream code never branches on data shape and
//! a partially-written document never breaks a read.

use chrono::{DateTime, TimeZone, Utc};
use deep_content_core::domain::{ChatMessage, ChatRole, ContentSource, Question};
use serde_json::Value;

/// Default values substituted for missing session fields, both on read
/// coalescing and by the repair utility. One explicit map instead of
/// per-field sniffing scattered across readers.
#[derive(Debug, Clone)]
pub struct FieldDefaults {
    pub title: &'static str,
    pub content_type: &'static str,
}

impl FieldDefaults {
    /// Defaults applied when reading a session back.
    pub const SESSION: FieldDefaults = FieldDefaults {
        title: "Untitled Content",
        content_type: "other",
    };

    /// Defaults applied by the repair utility, which marks what it touched.
    pub const REPAIR: FieldDefaults = FieldDefaults {
        title: "Repaired Content",
        content_type: "other",
    };

    /// Defaults applied when reading a conversation back.
    pub const CONVERSATION: FieldDefaults = FieldDefaults {
        title: "Untitled Conversation",
        content_type: "other",
    };
}

/// `None` or empty becomes the given default; everything else passes through.
pub fn coalesce_text(value: Option<String>, default: &str) -> String {
    match value {
        Some(text) if !text.is_empty() => text,
        _ => default.to_string(),
    }
}

/// Parses a stored `questions` JSONB value. A missing value, a non-array, or
/// malformed items never fail: they yield `[]` or items with type-correct
/// defaults.
pub fn parse_questions(value: Option<Value>) -> Vec<Question> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| {
            let object = item.as_object()?;
            Some(Question {
                id: object.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
                text: object.get("text").and_then(Value::as_str).unwrap_or_default().to_string(),
                answer: object
                    .get("answer")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect()
}

/// Parses a stored `content_source` column value.
pub fn parse_content_source(value: Option<String>) -> Option<ContentSource> {
    match value.as_deref() {
        Some("Anthropic") => Some(ContentSource::Anthropic),
        Some("OpenAI") => Some(ContentSource::OpenAI),
        _ => None,
    }
}

/// Normalizes any of the legacy timestamp shapes into a canonical
/// `DateTime<Utc>`:
///
/// - RFC 3339 strings,
/// - JSON numbers as epoch seconds or epoch milliseconds (values above
///   1e12 are read as milliseconds),
/// - `{"seconds": …}` objects.
///
/// Returns `None` for anything unparseable, leaving the caller to pick the
/// appropriate fallback.
pub fn normalize_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(number) => {
            let raw = number.as_f64()?;
            let millis = if raw.abs() >= 1e12 { raw } else { raw * 1000.0 };
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        Value::Object(object) => {
            let seconds = object.get("seconds")?.as_f64()?;
            Utc.timestamp_millis_opt((seconds * 1000.0) as i64).single()
        }
        _ => None,
    }
}

/// Parses a stored `messages` JSONB value. Messages with an unknown role are
/// dropped; messages with a missing or malformed timestamp get
/// `default_timestamp` (the conversation's own created-at).
pub fn parse_messages(value: Option<Value>, default_timestamp: DateTime<Utc>) -> Vec<ChatMessage> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| {
            let object = item.as_object()?;
            let role = match object.get("role").and_then(Value::as_str) {
                Some("user") => ChatRole::User,
                Some("assistant") => ChatRole::Assistant,
                _ => return None,
            };
            let timestamp = object
                .get("timestamp")
                .and_then(normalize_timestamp)
                .unwrap_or(default_timestamp);
            Some(ChatMessage {
                role,
                content: object
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                timestamp,
            })
        })
        .collect()
}
