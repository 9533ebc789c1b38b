//! services/api/src/web/state.rs
//!
//! The shared application state handed to every handler. Provider slots are
//! optional; a missing API key leaves its slot empty and the endpoints that
//! need it fail closed with a configuration error.

use std::sync::Arc;

use deep_content_core::ports::{DatabaseService, TextCompletionService, TranscriptService};

use crate::adapters::generation::FallbackGenerator;
use crate::adapters::questions::QuestionGenerator;
use crate::config::Config;
use crate::prefetch::QuestionPrefetcher;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    /// Follow-up question generation (Anthropic questions model).
    pub question_generator: Option<Arc<QuestionGenerator>>,
    /// Long-form content generation: Anthropic primary, OpenAI fallback.
    pub content_generator: FallbackGenerator,
    /// Research generation: the general-purpose text provider only.
    pub research_generator: FallbackGenerator,
    /// Chat providers selectable per request.
    pub chat_anthropic: Option<Arc<dyn TextCompletionService>>,
    pub chat_openai: Option<Arc<dyn TextCompletionService>>,
    pub transcripts: Option<Arc<dyn TranscriptService>>,
    pub prefetcher: Arc<QuestionPrefetcher>,
}
