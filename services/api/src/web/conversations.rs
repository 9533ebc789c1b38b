//! services/api/src/web/conversations.rs
//!
//! Persisted chat history endpoints. A conversation is saved whole when the
//! chat ends; the title falls back to the first user message when the client
//! does not supply one.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use deep_content_core::domain::{ChatMessage, Conversation};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::ApiFailure;

#[derive(Deserialize)]
pub struct SaveConversationRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub title: Option<String>,
}

pub async fn save_conversation_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<SaveConversationRequest>,
) -> Result<(StatusCode, Json<Conversation>), ApiFailure> {
    let title = match req.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => Conversation::derive_title(&req.messages),
    };

    let conversation = state
        .db
        .save_conversation(user_id, &title, &req.messages)
        .await
        .map_err(|e| {
            error!("Failed to save conversation: {:?}", e);
            ApiFailure::from(e)
        })?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub async fn list_conversations_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<Conversation>>, ApiFailure> {
    let conversations = state.db.list_conversations(user_id).await?;
    Ok(Json(conversations))
}

pub async fn get_conversation_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Conversation>, ApiFailure> {
    let conversation = state.db.get_conversation(user_id, conversation_id).await?;
    Ok(Json(conversation))
}

pub async fn delete_conversation_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(conversation_id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    state.db.delete_conversation(user_id, conversation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
