//! services/api/src/adapters/openai_llm.rs
//!
//! An adapter for OpenAI chat completions, implementing the
//! `TextCompletionService` port. It is the fallback provider whenever an
//! Anthropic call fails, and the chat endpoint's second selectable provider.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use deep_content_core::domain::{ChatMessage, ChatRole, ContentSource};
use deep_content_core::ports::{PortError, PortResult, TextCompletionService};

//=========================================================================================
// The Adapter
//=========================================================================================

/// Talks to the OpenAI chat completions API.
#[derive(Clone)]
pub struct OpenAiAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl OpenAiAdapter {
    pub fn new(
        client: Client<OpenAIConfig>,
        model: String,
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Self {
        Self {
            client,
            model,
            max_tokens,
            temperature,
        }
    }

    async fn run(&self, messages: Vec<ChatCompletionRequestMessage>) -> PortResult<String> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(messages)
            .max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let request = builder
            .build()
            .map_err(|e| PortError::Provider(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PortError::Provider(format!("OpenAI request failed: {}", e)))?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(PortError::Provider(
                "OpenAI returned an empty completion".to_string(),
            ));
        }
        Ok(text)
    }
}

fn to_request_message(message: &ChatMessage) -> PortResult<ChatCompletionRequestMessage> {
    let built = match message.role {
        ChatRole::User => ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| PortError::Provider(e.to_string()))?,
        ),
        ChatRole::Assistant => ChatCompletionRequestMessage::Assistant(
            ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| PortError::Provider(e.to_string()))?,
        ),
    };
    Ok(built)
}

#[async_trait]
impl TextCompletionService for OpenAiAdapter {
    fn source(&self) -> ContentSource {
        ContentSource::OpenAI
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| PortError::Provider(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()
                    .map_err(|e| PortError::Provider(e.to_string()))?,
            ),
        ];
        self.run(messages).await
    }

    async fn chat(&self, messages: &[ChatMessage]) -> PortResult<String> {
        let wire = messages
            .iter()
            .map(to_request_message)
            .collect::<PortResult<Vec<_>>>()?;
        self.run(wire).await
    }
}
