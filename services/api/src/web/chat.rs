//! services/api/src/web/chat.rs
//!
//! The generic chat endpoint with a per-request provider switch.

use std::sync::Arc;

use axum::{extract::State, Json};
use deep_content_core::domain::ChatMessage;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::web::state::AppState;
use crate::web::ApiFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatProvider {
    Anthropic,
    OpenAI,
}

fn default_provider() -> ChatProvider {
    ChatProvider::Anthropic
}

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default = "default_provider")]
    pub provider: ChatProvider,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub content: String,
}

/// POST /api/chat - run the message history against the selected provider.
#[utoipa::path(
    post,
    path = "/api/chat",
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty message history", body = crate::web::ErrorBody),
        (status = 500, description = "Selected provider not configured", body = crate::web::ErrorBody)
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiFailure> {
    if req.messages.is_empty() {
        return Err(ApiFailure::bad_request("At least one message is required"));
    }

    let provider = match req.provider {
        ChatProvider::Anthropic => state
            .chat_anthropic
            .as_ref()
            .ok_or_else(|| ApiFailure::internal("Anthropic API key is not configured"))?,
        ChatProvider::OpenAI => state
            .chat_openai
            .as_ref()
            .ok_or_else(|| ApiFailure::internal("OpenAI API key is not configured"))?,
    };

    let content = provider.chat(&req.messages).await.map_err(|e| {
        error!("Chat completion failed: {:?}", e);
        ApiFailure::internal("Failed to generate a chat response")
    })?;
    Ok(Json(ChatResponse { content }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::generation::test_support::ScriptedProvider;
    use crate::web::test_support::{test_state, StateOverrides};
    use axum::http::StatusCode;
    use chrono::Utc;
    use deep_content_core::domain::{ChatRole, ContentSource};

    fn user_message(content: &str) -> ChatMessage {
        ChatMessage {
            role: ChatRole::User,
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn routes_to_the_requested_provider() {
        let state = test_state(StateOverrides {
            chat_anthropic: Some(Arc::new(ScriptedProvider::ok(
                ContentSource::Anthropic,
                "claude says hi",
            ))),
            chat_openai: Some(Arc::new(ScriptedProvider::ok(
                ContentSource::OpenAI,
                "gpt says hi",
            ))),
            ..Default::default()
        });

        let response = chat_handler(
            State(state.clone()),
            Json(ChatRequest {
                provider: ChatProvider::Anthropic,
                messages: vec![user_message("hello")],
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.0.content, "claude says hi");

        let response = chat_handler(
            State(state),
            Json(ChatRequest {
                provider: ChatProvider::OpenAI,
                messages: vec![user_message("hello")],
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.0.content, "gpt says hi");
    }

    #[tokio::test]
    async fn missing_provider_key_fails_closed() {
        let state = test_state(StateOverrides::default());
        let failure = chat_handler(
            State(state),
            Json(ChatRequest {
                provider: ChatProvider::Anthropic,
                messages: vec![user_message("hello")],
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(failure.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failure.message, "Anthropic API key is not configured");
    }

    #[tokio::test]
    async fn empty_history_is_rejected() {
        let state = test_state(StateOverrides::default());
        let failure = chat_handler(
            State(state),
            Json(ChatRequest {
                provider: ChatProvider::OpenAI,
                messages: vec![],
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(failure.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn provider_defaults_to_anthropic() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"messages":[]}"#).unwrap();
        assert_eq!(req.provider, ChatProvider::Anthropic);
    }
}
