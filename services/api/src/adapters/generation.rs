//! services/api/src/adapters/generation.rs
//!
//! Composes two `TextCompletionService` providers into the fallback policy:
//! try the primary (Anthropic), and on any provider failure run the same
//! prompts against the secondary (OpenAI). The result carries which provider
//! actually produced the text, so callers can report it.

use std::sync::Arc;

use deep_content_core::domain::ContentSource;
use deep_content_core::ports::{PortError, PortResult, TextCompletionService};
use tracing::warn;

/// A completion together with the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedText {
    pub text: String,
    pub source: ContentSource,
}

/// Runs completions against a primary provider with a secondary fallback.
/// Either slot may be empty (the corresponding API key was not configured);
/// with both empty every call fails closed.
#[derive(Clone)]
pub struct FallbackGenerator {
    primary: Option<Arc<dyn TextCompletionService>>,
    secondary: Option<Arc<dyn TextCompletionService>>,
}

impl FallbackGenerator {
    pub fn new(
        primary: Option<Arc<dyn TextCompletionService>>,
        secondary: Option<Arc<dyn TextCompletionService>>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// True when at least one provider is configured.
    pub fn is_configured(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> PortResult<GeneratedText> {
        if let Some(primary) = &self.primary {
            match primary.complete(system_prompt, user_prompt).await {
                Ok(text) => {
                    return Ok(GeneratedText {
                        text,
                        source: primary.source(),
                    })
                }
                Err(e) => {
                    warn!(provider = %primary.source(), error = %e, "primary provider failed, falling back");
                }
            }
        }

        if let Some(secondary) = &self.secondary {
            let text = secondary.complete(system_prompt, user_prompt).await?;
            return Ok(GeneratedText {
                text,
                source: secondary.source(),
            });
        }

        Err(PortError::Provider(
            "No text generation provider is configured".to_string(),
        ))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use deep_content_core::domain::{ChatMessage, ContentSource};
    use deep_content_core::ports::{PortError, PortResult, TextCompletionService};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A scripted provider for tests: answers with a fixed string, or fails
    /// for the first `fail_first` calls.
    pub struct ScriptedProvider {
        pub source: ContentSource,
        pub reply: String,
        pub fail_first: usize,
        pub calls: Arc<AtomicUsize>,
    }

    impl ScriptedProvider {
        pub fn ok(source: ContentSource, reply: &str) -> Self {
            Self {
                source,
                reply: reply.to_string(),
                fail_first: 0,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn failing(source: ContentSource) -> Self {
            Self {
                source,
                reply: String::new(),
                fail_first: usize::MAX,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl TextCompletionService for ScriptedProvider {
        fn source(&self) -> ContentSource {
            self.source
        }

        async fn complete(&self, _system: &str, _user: &str) -> PortResult<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                Err(PortError::Provider("scripted failure".to_string()))
            } else {
                Ok(self.reply.clone())
            }
        }

        async fn chat(&self, _messages: &[ChatMessage]) -> PortResult<String> {
            self.complete("", "").await
        }
    }
}
