//! services/api/src/web/providers.rs
//!
//! The workflow endpoints that front the hosted providers: follow-up
//! question generation, research, final content generation, and transcript
//! ingestion. Each endpoint fails closed with a configuration error when the
//! API key it needs is absent; beyond that, every provider failure degrades
//! into a fallback payload rather than a hard error wherever the workflow
//! can still proceed.

use axum::{extract::State, http::StatusCode, Extension, Json};
use deep_content_core::domain::{ContentDraft, ContentSource, Question};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pipeline;
use crate::web::state::AppState;
use crate::web::ApiFailure;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<Question>,
}

#[derive(Deserialize, ToSchema)]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub draft: ContentDraft,
    pub questions: Vec<Question>,
    pub research: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub content: String,
    pub source: ContentSource,
}

#[derive(Deserialize)]
pub struct ResearchRequest {
    #[serde(flatten)]
    pub draft: ContentDraft,
    pub questions: Vec<Question>,
}

#[derive(Serialize, ToSchema)]
pub struct ResearchResponse {
    pub research: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UrlRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Serialize, ToSchema)]
pub struct ContentResponse {
    pub content: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Generate 3-5 follow-up questions for a content draft.
///
/// A fresh prefetched result for the same draft is consumed instead of
/// calling the provider again.
#[utoipa::path(
    post,
    path = "/api/anthropic/questions",
    responses(
        (status = 200, description = "3-5 follow-up questions, fallback set on an unparseable reply"),
        (status = 500, description = "Provider not configured or failed", body = crate::web::ErrorBody)
    )
)]
pub async fn questions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(draft): Json<ContentDraft>,
) -> Result<Json<QuestionsResponse>, ApiFailure> {
    if let Some(questions) = state.prefetcher.take_fresh(user_id, &draft) {
        info!(%user_id, "serving prefetched follow-up questions");
        return Ok(Json(QuestionsResponse { questions }));
    }

    let generator = state
        .question_generator
        .as_ref()
        .ok_or_else(|| ApiFailure::internal("Anthropic API key is not configured"))?;

    let questions = generator.generate(&draft).await.map_err(|e| {
        error!("Failed to generate questions: {:?}", e);
        ApiFailure::internal("Failed to generate questions from Anthropic")
    })?;

    Ok(Json(QuestionsResponse { questions }))
}

/// Generate the final content for a draft.
///
/// Runs the provider fallback chain inside a three-attempt retry; after
/// exhaustion the instructional failure message is returned as content.
#[utoipa::path(
    post,
    path = "/api/anthropic/generate",
    responses(
        (status = 200, description = "Generated content plus the provider that produced it"),
        (status = 500, description = "No provider configured", body = crate::web::ErrorBody)
    )
)]
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiFailure> {
    if !state.content_generator.is_configured() {
        return Err(ApiFailure::internal(
            "No text generation provider is configured",
        ));
    }

    let generated = pipeline::generate_content(
        &state.content_generator,
        &req.draft,
        &req.questions,
        &req.research,
        req.feedback.as_deref(),
    )
    .await;

    Ok(Json(GenerateResponse {
        content: generated.text,
        source: generated.source,
    }))
}

/// Produce the research document for a draft. Provider failures degrade to
/// a synthesized research document; the endpoint errors only when the
/// backing provider is unconfigured.
pub async fn research_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>, ApiFailure> {
    if !state.research_generator.is_configured() {
        return Err(ApiFailure::internal("OpenAI API key is not configured"));
    }

    let research =
        pipeline::generate_research(&state.research_generator, &req.draft, &req.questions).await;
    Ok(Json(ResearchResponse { research }))
}

/// Fetch a YouTube transcript. A caption-less video is still a 200 with an
/// explanatory message as its content.
pub async fn youtube_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UrlRequest>,
) -> Result<Json<ContentResponse>, ApiFailure> {
    if req.url.is_empty() {
        return Err(ApiFailure::bad_request("YouTube URL is required"));
    }
    let transcripts = state
        .transcripts
        .as_ref()
        .ok_or_else(|| ApiFailure::internal("API configuration error"))?;

    let content = transcripts.youtube_transcript(&req.url).await.map_err(|e| {
        error!("Failed to process YouTube request: {:?}", e);
        ApiFailure::internal("Failed to process YouTube video")
    })?;
    Ok(Json(ContentResponse { content }))
}

/// Scrape a web page into a plain-text block with metadata headers.
pub async fn web_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UrlRequest>,
) -> Result<Json<ContentResponse>, ApiFailure> {
    if req.url.is_empty() {
        return Err(ApiFailure::bad_request("Website URL is required"));
    }
    let transcripts = state
        .transcripts
        .as_ref()
        .ok_or_else(|| ApiFailure::internal("API configuration error"))?;

    let content = transcripts.web_content(&req.url).await.map_err(|e| {
        error!("Failed to process web request: {:?}", e);
        ApiFailure::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(ContentResponse { content }))
}
