//! services/api/src/adapters/anthropic.rs
//!
//! An adapter for the Anthropic Messages API, implementing the
//! `TextCompletionService` port over raw `reqwest` (Anthropic has no
//! first-party Rust SDK). One adapter instance is configured per use site,
//! so question generation and long-form generation can run different models
//! and token budgets.

use async_trait::async_trait;
use deep_content_core::domain::{ChatMessage, ChatRole, ContentSource};
use deep_content_core::ports::{PortError, PortResult, TextCompletionService};
use serde::{Deserialize, Serialize};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

fn wire_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    }
}

//=========================================================================================
// The Adapter
//=========================================================================================

/// Talks to the Anthropic Messages API.
pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl AnthropicAdapter {
    pub fn new(api_key: String, model: String, max_tokens: u32, temperature: Option<f32>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            max_tokens,
            temperature,
        }
    }

    async fn send(&self, request: &MessagesRequest<'_>) -> PortResult<String> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| PortError::Provider(format!("Anthropic request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Provider(format!(
                "Anthropic API returned {}: {}",
                status, body
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| PortError::Provider(format!("Anthropic response unreadable: {}", e)))?;

        let text: String = parsed
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(PortError::Provider(
                "Anthropic returned an empty completion".to_string(),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextCompletionService for AnthropicAdapter {
    fn source(&self) -> ContentSource {
        ContentSource::Anthropic
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> PortResult<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: Some(system_prompt),
            messages: vec![WireMessage {
                role: "user",
                content: user_prompt,
            }],
        };
        self.send(&request).await
    }

    async fn chat(&self, messages: &[ChatMessage]) -> PortResult<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: None,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: wire_role(m.role),
                    content: &m.content,
                })
                .collect(),
        };
        self.send(&request).await
    }
}
