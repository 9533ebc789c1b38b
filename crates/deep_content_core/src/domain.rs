//! crates/deep_content_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework; the serde
//! derives exist only because the same shapes travel over the JSON API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The transient state captured at step one of the content workflow.
///
/// Held client-side between steps and submitted with every subsequent
/// request; discarded on "start over".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContentDraft {
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub idea: String,
    #[serde(default)]
    pub transcript: String,
}

/// A single AI-generated (or fallback) follow-up question.
///
/// Immutable once it has been passed to the research stage; only `answer`
/// is mutated by the user before that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub answer: String,
}

impl Question {
    /// A freshly generated question with no answer yet. Ids follow the
    /// `q-<n>` convention of the question parser.
    pub fn unanswered(index: usize, text: impl Into<String>) -> Self {
        Self {
            id: format!("q-{}", index + 1),
            text: text.into(),
            answer: String::new(),
        }
    }
}

/// Which LLM provider ultimately produced a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentSource {
    Anthropic,
    OpenAI,
}

impl ContentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentSource::Anthropic => "Anthropic",
            ContentSource::OpenAI => "OpenAI",
        }
    }
}

impl std::fmt::Display for ContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted record of one full idea → research → content generation pass.
///
/// Invariant: `id` and the timestamps are assigned only by the persistence
/// layer; a session that has not been saved has no id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content_type: String,
    pub idea: String,
    pub questions: Vec<Question>,
    pub transcript: String,
    pub research: String,
    pub generated_content: String,
    pub content_source: Option<ContentSource>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A content session that has not been persisted yet. The persistence layer
/// assigns the id and server-side timestamps when it is saved.
#[derive(Debug, Clone)]
pub struct NewContentSession {
    pub user_id: Uuid,
    pub title: String,
    pub content_type: String,
    pub idea: String,
    pub questions: Vec<Question>,
    pub transcript: String,
    pub research: String,
    pub generated_content: String,
    pub content_source: Option<ContentSource>,
}

/// The author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A persisted chat conversation. The message list is append-only while the
/// chat is active and never mutated after save except by full delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Derives a display title from the first user message, truncated to
    /// 50 characters with an ellipsis. Used when no title is supplied on save.
    pub fn derive_title(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .find(|m| m.role == ChatRole::User)
            .map(|m| truncate_title(&m.content))
            .unwrap_or_else(|| "New Conversation".to_string())
    }
}

/// First 50 characters of `text`, with an ellipsis when it was longer.
/// Also used to derive content-session titles from the idea.
pub fn truncate_title(text: &str) -> String {
    let truncated: String = text.chars().take(50).collect();
    if text.chars().count() > 50 {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

// Represents a user - used throughout the app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
