//! services/api/src/pipeline.rs
//!
//! The research and content-generation flows behind the provider endpoints.
//! Both flows are total: research degrades to a synthesized document built
//! from the draft itself, and content generation retries three times before
//! degrading to an instructional failure message. The caller always gets
//! something displayable.

use std::time::Duration;

use deep_content_core::domain::{ContentDraft, ContentSource, Question};
use deep_content_core::fallback::{fallback_research, generation_failure_message};
use deep_content_core::prompt::{build_generation_prompts, build_research_prompts};
use tracing::warn;

use crate::adapters::generation::{FallbackGenerator, GeneratedText};
use crate::retry::RetryPolicy;

/// Three attempts, one second apart, before the failure message applies.
const GENERATION_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(1));

/// Produces the research document for a draft. Provider failures are
/// absorbed: the synthesized fallback research is returned instead, so this
/// flow never errors once a provider is configured.
pub async fn generate_research(
    generator: &FallbackGenerator,
    draft: &ContentDraft,
    questions: &[Question],
) -> String {
    let prompts = build_research_prompts(draft, questions);
    match generator.complete(&prompts.system, &prompts.user).await {
        Ok(generated) => generated.text,
        Err(e) => {
            warn!(error = %e, "research generation failed, synthesizing fallback research");
            fallback_research(draft)
        }
    }
}

/// Produces the final content for a draft. Each attempt runs the full
/// provider fallback chain; after the retry budget is exhausted the
/// instructional failure message is returned with an OpenAI source, since
/// that is the provider the last attempt ended on.
pub async fn generate_content(
    generator: &FallbackGenerator,
    draft: &ContentDraft,
    questions: &[Question],
    research: &str,
    feedback: Option<&str>,
) -> GeneratedText {
    let prompts = build_generation_prompts(draft, questions, research, feedback);

    let result = GENERATION_RETRY
        .run(|attempt| {
            let system = prompts.system.clone();
            let user = prompts.user.clone();
            async move {
                if attempt > 1 {
                    warn!(attempt, "retrying content generation");
                }
                generator.complete(&system, &user).await
            }
        })
        .await;

    match result {
        Ok(generated) => generated,
        Err(e) => {
            warn!(error = %e, "content generation exhausted retries, returning failure message");
            GeneratedText {
                text: generation_failure_message(&draft.content_type),
                source: ContentSource::OpenAI,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::generation::test_support::ScriptedProvider;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio::time::Instant;

    fn draft() -> ContentDraft {
        ContentDraft {
            content_type: "Blog Post".to_string(),
            idea: "How remote work affects team culture".to_string(),
            transcript: String::new(),
        }
    }

    #[tokio::test]
    async fn research_uses_the_provider_reply() {
        let generator = FallbackGenerator::new(
            Some(Arc::new(ScriptedProvider::ok(
                ContentSource::Anthropic,
                "### Research\ndetailed findings",
            ))),
            None,
        );

        let research = generate_research(&generator, &draft(), &[]).await;
        assert_eq!(research, "### Research\ndetailed findings");
    }

    #[tokio::test]
    async fn research_degrades_to_synthesized_document() {
        let generator = FallbackGenerator::new(
            Some(Arc::new(ScriptedProvider::failing(ContentSource::Anthropic))),
            Some(Arc::new(ScriptedProvider::failing(ContentSource::OpenAI))),
        );

        let research = generate_research(&generator, &draft(), &[]).await;
        assert!(research.contains("Blog Post"));
        assert!(research.contains("remote, affects, culture"));
    }

    #[tokio::test]
    async fn content_success_reports_the_producing_provider() {
        let generator = FallbackGenerator::new(
            Some(Arc::new(ScriptedProvider::failing(ContentSource::Anthropic))),
            Some(Arc::new(ScriptedProvider::ok(
                ContentSource::OpenAI,
                "the finished post",
            ))),
        );

        let generated = generate_content(&generator, &draft(), &[], "research", None).await;
        assert_eq!(generated.text, "the finished post");
        assert_eq!(generated.source, ContentSource::OpenAI);
    }

    #[tokio::test(start_paused = true)]
    async fn content_makes_three_attempts_before_the_failure_message() {
        let primary = Arc::new(ScriptedProvider::failing(ContentSource::Anthropic));
        let secondary = Arc::new(ScriptedProvider::failing(ContentSource::OpenAI));
        let primary_calls = primary.calls.clone();
        let secondary_calls = secondary.calls.clone();
        let generator = FallbackGenerator::new(Some(primary), Some(secondary));

        let start = Instant::now();
        let generated = generate_content(&generator, &draft(), &[], "research", None).await;

        assert_eq!(primary_calls.load(Ordering::SeqCst), 3);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(generated.text.starts_with("[Unable to generate content]"));
        assert!(generated.text.contains("Blog Post"));
        assert_eq!(generated.source, ContentSource::OpenAI);
    }

    #[tokio::test(start_paused = true)]
    async fn content_recovers_on_a_later_attempt() {
        let flaky = ScriptedProvider {
            source: ContentSource::Anthropic,
            reply: "recovered content".to_string(),
            fail_first: 2,
            calls: Default::default(),
        };
        let generator = FallbackGenerator::new(Some(Arc::new(flaky)), None);

        let generated = generate_content(&generator, &draft(), &[], "research", None).await;
        assert_eq!(generated.text, "recovered content");
        assert_eq!(generated.source, ContentSource::Anthropic);
    }
}
