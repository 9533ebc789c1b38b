//! crates/deep_content_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or hosted LLM providers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    ChatMessage, ContentSession, ContentSource, Conversation, NewContentSession, User,
    UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g. the
/// database or a hosted LLM API).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The upstream provider failed: network error, non-2xx status, missing
    /// credentials, or a response with no usable content. Failures of this
    /// kind are what trigger the fallback policies.
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence operations. Every content-session and conversation operation
/// takes the acting user's id explicitly; reads and deletes refuse with
/// [`PortError::Unauthorized`] when the stored owner does not match.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Content Sessions ---
    async fn save_content_session(&self, session: NewContentSession)
        -> PortResult<ContentSession>;

    async fn get_content_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> PortResult<ContentSession>;

    /// All sessions belonging to `user_id`, newest first.
    async fn list_content_sessions(&self, user_id: Uuid) -> PortResult<Vec<ContentSession>>;

    /// Replaces the generated content (and its source) after a regeneration.
    /// Single-document read-modify-write with no optimistic concurrency
    /// check; two concurrent regenerations race, last write wins.
    async fn update_generated_content(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        generated_content: &str,
        content_source: ContentSource,
    ) -> PortResult<()>;

    async fn delete_content_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<()>;

    /// Patches missing required fields on a stored session with type-correct
    /// defaults. Returns `true` when the document existed (repaired or
    /// already intact).
    async fn repair_content_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<bool>;

    /// Applies [`repair_content_session`](Self::repair_content_session) to
    /// every session of the user; returns the number repaired.
    async fn repair_all_sessions(&self, user_id: Uuid) -> PortResult<usize>;

    // --- Conversations ---
    async fn save_conversation(
        &self,
        user_id: Uuid,
        title: &str,
        messages: &[ChatMessage],
    ) -> PortResult<Conversation>;

    async fn get_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> PortResult<Conversation>;

    async fn list_conversations(&self, user_id: Uuid) -> PortResult<Vec<Conversation>>;

    async fn delete_conversation(&self, user_id: Uuid, conversation_id: Uuid) -> PortResult<()>;
}

/// A hosted text-generation provider. Implementations wrap one concrete
/// vendor API; the fallback policy composes two of them.
#[async_trait]
pub trait TextCompletionService: Send + Sync {
    /// Which provider this adapter talks to. Reported to the caller so the
    /// UI can show where the content came from.
    fn source(&self) -> ContentSource;

    /// Runs a single system-prompt + user-prompt completion and returns the
    /// generated text. An empty completion is a [`PortError::Provider`].
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> PortResult<String>;

    /// Runs a multi-turn chat completion over the full message history.
    async fn chat(&self, messages: &[ChatMessage]) -> PortResult<String>;
}

/// The transcript/web-scraping provider.
#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// A plain-text YouTube transcript with metadata headers, or the
    /// explanatory no-transcript message. Never an error for missing
    /// captions: the caller must always have something displayable.
    async fn youtube_transcript(&self, url: &str) -> PortResult<String>;

    /// Scraped text content of a web page with title/source headers.
    async fn web_content(&self, url: &str) -> PortResult<String>;
}
