//! services/api/src/web/test_support.rs
//!
//! An in-memory `DatabaseService` and an `AppState` builder for handler
//! tests. The mock mirrors the production adapter's ownership semantics so
//! permission checks can be exercised without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deep_content_core::domain::{
    ChatMessage, ContentSession, ContentSource, Conversation, NewContentSession, User,
    UserCredentials,
};
use deep_content_core::ports::{
    DatabaseService, PortError, PortResult, TextCompletionService, TranscriptService,
};
use uuid::Uuid;

use crate::adapters::generation::FallbackGenerator;
use crate::adapters::questions::QuestionGenerator;
use crate::config::Config;
use crate::prefetch::QuestionPrefetcher;
use crate::web::state::AppState;

#[derive(Default)]
struct MockTables {
    users: HashMap<String, UserCredentials>,
    auth_sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    sessions: HashMap<Uuid, ContentSession>,
    conversations: HashMap<Uuid, Conversation>,
}

#[derive(Default)]
pub struct MockDb {
    tables: Mutex<MockTables>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockTables> {
        self.tables.lock().unwrap()
    }

    /// The raw stored session, bypassing ownership checks. Used by tests to
    /// assert that refused operations left the document unchanged.
    pub fn stored_session(&self, session_id: Uuid) -> Option<ContentSession> {
        self.lock().sessions.get(&session_id).cloned()
    }
}

#[async_trait]
impl DatabaseService for MockDb {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut tables = self.lock();
        let user_id = Uuid::new_v4();
        tables.users.insert(
            email.to_string(),
            UserCredentials {
                user_id,
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
            },
        );
        Ok(User {
            user_id,
            email: Some(email.to_string()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.lock()
            .users
            .get(email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.lock()
            .auth_sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.lock()
            .auth_sessions
            .get(session_id)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(user_id, _)| *user_id)
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.lock().auth_sessions.remove(session_id);
        Ok(())
    }

    async fn save_content_session(
        &self,
        session: NewContentSession,
    ) -> PortResult<ContentSession> {
        let now = Utc::now();
        let stored = ContentSession {
            id: Uuid::new_v4(),
            user_id: session.user_id,
            title: session.title,
            content_type: session.content_type,
            idea: session.idea,
            questions: session.questions,
            transcript: session.transcript,
            research: session.research,
            generated_content: session.generated_content,
            content_source: session.content_source,
            created_at: now,
            updated_at: now,
        };
        self.lock().sessions.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_content_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> PortResult<ContentSession> {
        let tables = self.lock();
        let session = tables
            .sessions
            .get(&session_id)
            .ok_or_else(|| PortError::NotFound(format!("Content session {} not found", session_id)))?;
        if session.user_id != user_id {
            return Err(PortError::Unauthorized);
        }
        Ok(session.clone())
    }

    async fn list_content_sessions(&self, user_id: Uuid) -> PortResult<Vec<ContentSession>> {
        let tables = self.lock();
        let mut sessions: Vec<ContentSession> = tables
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn update_generated_content(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        generated_content: &str,
        content_source: ContentSource,
    ) -> PortResult<()> {
        let mut tables = self.lock();
        let session = tables
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| PortError::NotFound(format!("Content session {} not found", session_id)))?;
        if session.user_id != user_id {
            return Err(PortError::Unauthorized);
        }
        session.generated_content = generated_content.to_string();
        session.content_source = Some(content_source);
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_content_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<()> {
        let mut tables = self.lock();
        let session = tables
            .sessions
            .get(&session_id)
            .ok_or_else(|| PortError::NotFound(format!("Content session {} not found", session_id)))?;
        if session.user_id != user_id {
            return Err(PortError::Unauthorized);
        }
        tables.sessions.remove(&session_id);
        Ok(())
    }

    async fn repair_content_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<bool> {
        let mut tables = self.lock();
        let Some(session) = tables.sessions.get_mut(&session_id) else {
            return Ok(false);
        };
        if session.user_id != user_id {
            return Err(PortError::Unauthorized);
        }
        if session.title.is_empty() {
            session.title = "Repaired Content".to_string();
        }
        if session.content_type.is_empty() {
            session.content_type = "other".to_string();
        }
        session.updated_at = Utc::now();
        Ok(true)
    }

    async fn repair_all_sessions(&self, user_id: Uuid) -> PortResult<usize> {
        let ids: Vec<Uuid> = self
            .lock()
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.id)
            .collect();
        let mut repaired = 0;
        for id in ids {
            if self.repair_content_session(user_id, id).await? {
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
        let now = Utc::now();
        let stored = Conversation {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            messages: messages.to_vec(),
            created_at: now,
            updated_at: now,
        };
        self.lock().conversations.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> PortResult<Conversation> {
        let tables = self.lock();
        let conversation = tables.conversations.get(&conversation_id).ok_or_else(|| {
            PortError::NotFound(format!("Conversation {} not found", conversation_id))
        })?;
        if conversation.user_id != user_id {
            return Err(PortError::Unauthorized);
        }
        Ok(conversation.clone())
    }

    async fn list_conversations(&self, user_id: Uuid) -> PortResult<Vec<Conversation>> {
        let tables = self.lock();
        let mut conversations: Vec<Conversation> = tables
            .conversations
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(conversations)
    }

    async fn delete_conversation(&self, user_id: Uuid, conversation_id: Uuid) -> PortResult<()> {
        let mut tables = self.lock();
        let conversation = tables.conversations.get(&conversation_id).ok_or_else(|| {
            PortError::NotFound(format!("Conversation {} not found", conversation_id))
        })?;
        if conversation.user_id != user_id {
            return Err(PortError::Unauthorized);
        }
        tables.conversations.remove(&conversation_id);
        Ok(())
    }
}

//=========================================================================================
// AppState construction
//=========================================================================================

#[derive(Default)]
pub struct StateOverrides {
    pub db: Option<Arc<MockDb>>,
    pub question_provider: Option<Arc<dyn TextCompletionService>>,
    pub content_primary: Option<Arc<dyn TextCompletionService>>,
    pub content_secondary: Option<Arc<dyn TextCompletionService>>,
    pub research_provider: Option<Arc<dyn TextCompletionService>>,
    pub chat_anthropic: Option<Arc<dyn TextCompletionService>>,
    pub chat_openai: Option<Arc<dyn TextCompletionService>>,
    pub transcripts: Option<Arc<dyn TranscriptService>>,
}

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        cors_origin: "http://localhost:3000".to_string(),
        anthropic_api_key: None,
        openai_api_key: None,
        supadata_api_key: None,
        anthropic_model: "claude-3-opus-20240229".to_string(),
        anthropic_questions_model: "claude-3-5-sonnet-20240620".to_string(),
        openai_model: "gpt-4-turbo".to_string(),
    }
}

pub fn test_state(overrides: StateOverrides) -> Arc<AppState> {
    let db: Arc<dyn DatabaseService> =
        overrides.db.unwrap_or_else(|| Arc::new(MockDb::new()));
    Arc::new(AppState {
        db,
        config: Arc::new(test_config()),
        question_generator: overrides
            .question_provider
            .map(|provider| Arc::new(QuestionGenerator::new(provider))),
        content_generator: FallbackGenerator::new(
            overrides.content_primary,
            overrides.content_secondary,
        ),
        research_generator: FallbackGenerator::new(overrides.research_provider, None),
        chat_anthropic: overrides.chat_anthropic,
        chat_openai: overrides.chat_openai,
        transcripts: overrides.transcripts,
        prefetcher: Arc::new(QuestionPrefetcher::new()),
    })
}
