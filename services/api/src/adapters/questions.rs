//! services/api/src/adapters/questions.rs
//!
//! Follow-up question generation. Runs the question prompts against a single
//! provider and parses 3-5 questions out of the free-form numbered-list reply.
//! Parsing is tolerant: any line opening with "<number><separator>" starts an
//! item, continuation lines are folded into the current item, and a reply
//! with no recognizable items yields the fixed fallback set so the workflow
//! never stalls.

use std::sync::{Arc, LazyLock};

use deep_content_core::domain::{ContentDraft, Question};
use deep_content_core::fallback::fallback_questions;
use deep_content_core::ports::{PortResult, TextCompletionService};
use deep_content_core::prompt::build_question_prompts;
use regex::Regex;
use tracing::warn;

static ITEM_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)\s]+\s*(.*)$").unwrap());

/// Parses a numbered list out of free-form provider text. Each item runs
/// until the next numbered line or the end of the text.
pub fn parse_numbered_questions(text: &str) -> Vec<Question> {
    let mut items: Vec<String> = Vec::new();

    for line in text.lines() {
        if let Some(captures) = ITEM_START.captures(line) {
            let head = captures
                .get(1)
                .map(|m| m.as_str())
                .unwrap_or_default()
                .to_string();
            items.push(head);
        } else if let Some(current) = items.last_mut() {
            current.push('\n');
            current.push_str(line);
        }
    }

    items
        .into_iter()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(index, text)| Question::unanswered(index, text))
        .collect()
}

/// Generates follow-up questions for a content draft.
pub struct QuestionGenerator {
    provider: Arc<dyn TextCompletionService>,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn TextCompletionService>) -> Self {
        Self { provider }
    }

    /// Asks the provider for 3-5 tailored questions. A parse that yields
    /// nothing returns the four generic fallback questions instead; a
    /// provider failure is surfaced to the caller unchanged.
    pub async fn generate(&self, draft: &ContentDraft) -> PortResult<Vec<Question>> {
        let prompts = build_question_prompts(draft);
        let reply = self.provider.complete(&prompts.system, &prompts.user).await?;

        let questions = parse_numbered_questions(&reply);
        if questions.is_empty() {
            warn!("no questions parsed from provider reply, using fallback set");
            return Ok(fallback_questions(&draft.content_type));
        }
        Ok(questions)
    }
}
