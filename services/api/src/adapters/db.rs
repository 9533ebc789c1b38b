//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `DatabaseService` port from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.
//!
//! Every read goes through the normalization helpers in
//! [`crate::adapters::normalize`], so a partially-written or legacy document
//! never crashes a caller; ownership checks are performed here in
//! application code before any mutation is issued.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deep_content_core::domain::{
    ChatMessage, ContentSession, ContentSource, Conversation, NewContentSession, User,
    UserCredentials,
};
use deep_content_core::ports::{DatabaseService, PortError, PortResult};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::adapters::normalize::{
    coalesce_text, parse_content_source, parse_messages, parse_questions, FieldDefaults,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    user_id: Uuid,
    title: Option<String>,
    content_type: Option<String>,
    idea: Option<String>,
    questions: Option<Value>,
    transcript: Option<String>,
    research: Option<String>,
    generated_content: Option<String>,
    content_source: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Coalesces every nullable field through the session default map so a
    /// malformed stored document still yields a renderable session.
    fn to_domain(self) -> ContentSession {
        let defaults = FieldDefaults::SESSION;
        ContentSession {
            id: self.id,
            user_id: self.user_id,
            title: coalesce_text(self.title, defaults.title),
            content_type: coalesce_text(self.content_type, defaults.content_type),
            idea: self.idea.unwrap_or_default(),
            questions: parse_questions(self.questions),
            transcript: self.transcript.unwrap_or_default(),
            research: self.research.unwrap_or_default(),
            generated_content: self.generated_content.unwrap_or_default(),
            content_source: parse_content_source(self.content_source),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ConversationRecord {
    id: Uuid,
    user_id: Uuid,
    title: Option<String>,
    messages: Option<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationRecord {
    fn to_domain(self) -> Conversation {
        Conversation {
            id: self.id,
            user_id: self.user_id,
            title: coalesce_text(self.title, FieldDefaults::CONVERSATION.title),
            messages: parse_messages(self.messages, self.created_at),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SESSION_COLUMNS: &str = "id, user_id, title, content_type, idea, questions, transcript, \
                               research, generated_content, content_source, created_at, updated_at";

const CONVERSATION_COLUMNS: &str = "id, user_id, title, messages, created_at, updated_at";

impl DbAdapter {
    async fn fetch_session_record(&self, session_id: Uuid) -> PortResult<SessionRecord> {
        sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {} FROM content_sessions WHERE id = $1",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Content session {} not found", session_id)))
    }

    async fn fetch_conversation_record(
        &self,
        conversation_id: Uuid,
    ) -> PortResult<ConversationRecord> {
        sqlx::query_as::<_, ConversationRecord>(&format!(
            "SELECT {} FROM conversations WHERE id = $1",
            CONVERSATION_COLUMNS
        ))
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Conversation {} not found", conversation_id)))
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(User {
            user_id: record.user_id,
            email: Some(record.email),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))?;

        Ok(UserCredentials {
            user_id: record.user_id,
            email: record.email,
            hashed_password: record.hashed_password,
        })
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        user_id.map(|(id,)| id).ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn save_content_session(
        &self,
        session: NewContentSession,
    ) -> PortResult<ContentSession> {
        let questions = serde_json::to_value(&session.questions)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "INSERT INTO content_sessions \
             (user_id, title, content_type, idea, questions, transcript, research, \
              generated_content, content_source) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {}",
            SESSION_COLUMNS
        ))
        .bind(session.user_id)
        .bind(&session.title)
        .bind(&session.content_type)
        .bind(&session.idea)
        .bind(questions)
        .bind(&session.transcript)
        .bind(&session.research)
        .bind(&session.generated_content)
        .bind(session.content_source.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn get_content_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> PortResult<ContentSession> {
        let record = self.fetch_session_record(session_id).await?;
        if record.user_id != user_id {
            return Err(PortError::Unauthorized);
        }
        Ok(record.to_domain())
    }

    async fn list_content_sessions(&self, user_id: Uuid) -> PortResult<Vec<ContentSession>> {
        let records = sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {} FROM content_sessions WHERE user_id = $1 ORDER BY created_at DESC",
            SESSION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn update_generated_content(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        generated_content: &str,
        content_source: ContentSource,
    ) -> PortResult<()> {
        // Ownership is checked before the write; the write itself is a plain
        // single-document update with no optimistic concurrency check, so
        // concurrent regenerations race and the last write wins.
        let record = self.fetch_session_record(session_id).await?;
        if record.user_id != user_id {
            return Err(PortError::Unauthorized);
        }

        sqlx::query(
            "UPDATE content_sessions \
             SET generated_content = $1, content_source = $2, updated_at = now() \
             WHERE id = $3",
        )
        .bind(generated_content)
        .bind(content_source.as_str())
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_content_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<()> {
        let record = self.fetch_session_record(session_id).await?;
        if record.user_id != user_id {
            return Err(PortError::Unauthorized);
        }

        sqlx::query("DELETE FROM content_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn repair_content_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<bool> {
        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {} FROM content_sessions WHERE id = $1",
            SESSION_COLUMNS
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        let Some(record) = record else {
            return Ok(false);
        };
        if record.user_id != user_id {
            return Err(PortError::Unauthorized);
        }

        let defaults = FieldDefaults::REPAIR;
        sqlx::query(
            "UPDATE content_sessions SET \
             title = COALESCE(NULLIF(title, ''), $1), \
             content_type = COALESCE(NULLIF(content_type, ''), $2), \
             idea = COALESCE(idea, ''), \
             questions = COALESCE(questions, '[]'::jsonb), \
             transcript = COALESCE(transcript, ''), \
             research = COALESCE(research, ''), \
             generated_content = COALESCE(generated_content, ''), \
             updated_at = now() \
             WHERE id = $3",
        )
        .bind(defaults.title)
        .bind(defaults.content_type)
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(true)
    }

    async fn repair_all_sessions(&self, user_id: Uuid) -> PortResult<usize> {
        let ids: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM content_sessions WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(unexpected)?;

        let mut repaired = 0;
        for (session_id,) in ids {
            if self.repair_content_session(user_id, session_id).await? {
                repaired += 1;
            }
        }
        Ok(repaired)
    }

    async fn save_conversation(
        &self,
        user_id: Uuid,
        title: &str,
        messages: &[ChatMessage],
    ) -> PortResult<Conversation> {
        let messages = serde_json::to_value(messages)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record = sqlx::query_as::<_, ConversationRecord>(&format!(
            "INSERT INTO conversations (user_id, title, messages) VALUES ($1, $2, $3) \
             RETURNING {}",
            CONVERSATION_COLUMNS
        ))
        .bind(user_id)
        .bind(title)
        .bind(messages)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn get_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> PortResult<Conversation> {
        let record = self.fetch_conversation_record(conversation_id).await?;
        if record.user_id != user_id {
            return Err(PortError::Unauthorized);
        }
        Ok(record.to_domain())
    }

    async fn list_conversations(&self, user_id: Uuid) -> PortResult<Vec<Conversation>> {
        let records = sqlx::query_as::<_, ConversationRecord>(&format!(
            "SELECT {} FROM conversations WHERE user_id = $1 ORDER BY created_at DESC",
            CONVERSATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_conversation(&self, user_id: Uuid, conversation_id: Uuid) -> PortResult<()> {
        let record = self.fetch_conversation_record(conversation_id).await?;
        if record.user_id != user_id {
            return Err(PortError::Unauthorized);
        }

        sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(conversation_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
