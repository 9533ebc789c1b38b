//! services/api/src/web/sessions.rs
//!
//! Content-session endpoints: the full idea-to-content pipeline on create,
//! listing with the read-after-save backoff, regeneration with feedback,
//! and the repair utility for documents written by earlier versions of the
//! save path.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use deep_content_core::domain::{truncate_title, ContentDraft, ContentSession, NewContentSession, Question};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pipeline;
use crate::retry::RetryPolicy;
use crate::web::providers::GenerateResponse;
use crate::web::state::AppState;
use crate::web::ApiFailure;

/// Compensates for read-after-write lag: an empty list right after a save
/// is retried before being believed.
const LIST_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(1));

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    #[serde(flatten)]
    pub draft: ContentDraft,
    pub questions: Vec<Question>,
}

#[derive(Deserialize, ToSchema)]
pub struct RegenerateRequest {
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct RepairResponse {
    pub repaired: bool,
}

#[derive(Serialize, ToSchema)]
pub struct RepairAllResponse {
    pub repaired: usize,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Run the research + generation pipeline over a finished draft and persist
/// the resulting session. The pipeline is total, so a session is saved even
/// when every provider call failed; its content is then the fallback text.
#[utoipa::path(
    post,
    path = "/api/sessions",
    responses(
        (status = 201, description = "The persisted content session"),
        (status = 500, description = "Persistence failure", body = crate::web::ErrorBody)
    )
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ContentSession>), ApiFailure> {
    let research =
        pipeline::generate_research(&state.research_generator, &req.draft, &req.questions).await;
    let generated = pipeline::generate_content(
        &state.content_generator,
        &req.draft,
        &req.questions,
        &research,
        None,
    )
    .await;

    let session = state
        .db
        .save_content_session(NewContentSession {
            user_id,
            title: truncate_title(&req.draft.idea),
            content_type: req.draft.content_type,
            idea: req.draft.idea,
            questions: req.questions,
            transcript: req.draft.transcript,
            research,
            generated_content: generated.text,
            content_source: Some(generated.source),
        })
        .await
        .map_err(|e| {
            error!("Failed to save content session: {:?}", e);
            ApiFailure::from(e)
        })?;

    info!(session_id = %session.id, %user_id, "content session created");
    Ok((StatusCode::CREATED, Json(session)))
}

/// List the user's sessions, newest first.
#[utoipa::path(
    get,
    path = "/api/sessions",
    responses(
        (status = 200, description = "The user's sessions, newest first")
    )
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<ContentSession>>, ApiFailure> {
    let sessions = LIST_RETRY
        .run_until(
            |_| state.db.list_content_sessions(user_id),
            |sessions: &Vec<ContentSession>| !sessions.is_empty(),
        )
        .await?;
    Ok(Json(sessions))
}

pub async fn get_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ContentSession>, ApiFailure> {
    let session = state.db.get_content_session(user_id, session_id).await?;
    Ok(Json(session))
}

/// Regenerate a session's content, optionally steered by feedback. The
/// stored idea, answers, and research are reused unchanged; only the
/// generated content and its source are replaced.
pub async fn regenerate_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<RegenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiFailure> {
    let session = state.db.get_content_session(user_id, session_id).await?;

    let draft = ContentDraft {
        content_type: session.content_type,
        idea: session.idea,
        transcript: session.transcript,
    };
    let generated = pipeline::generate_content(
        &state.content_generator,
        &draft,
        &session.questions,
        &session.research,
        req.feedback.as_deref(),
    )
    .await;

    state
        .db
        .update_generated_content(user_id, session_id, &generated.text, generated.source)
        .await?;

    Ok(Json(GenerateResponse {
        content: generated.text,
        source: generated.source,
    }))
}

pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    state.db.delete_content_session(user_id, session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Patch missing fields on one stored session with type-correct defaults.
pub async fn repair_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<RepairResponse>, ApiFailure> {
    let repaired = state.db.repair_content_session(user_id, session_id).await?;
    Ok(Json(RepairResponse { repaired }))
}

/// Repair every session belonging to the user.
pub async fn repair_all_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<RepairAllResponse>, ApiFailure> {
    let repaired = state.db.repair_all_sessions(user_id).await?;
    Ok(Json(RepairAllResponse { repaired }))
}

/// Fire question generation in the background so the questions step loads
/// instantly. Always accepted; a failed or superseded prefetch is silently
/// discarded and the foreground request runs the provider call itself.
pub async fn prefetch_questions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(draft): Json<ContentDraft>,
) -> StatusCode {
    if let Some(generator) = &state.question_generator {
        state.prefetcher.spawn(Arc::clone(generator), user_id, draft);
    }
    StatusCode::ACCEPTED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{test_state, MockDb, StateOverrides};

    fn request(idea: &str) -> CreateSessionRequest {
        CreateSessionRequest {
            draft: ContentDraft {
                content_type: "Blog Post".to_string(),
                idea: idea.to_string(),
                transcript: String::new(),
            },
            questions: vec![Question {
                id: "q-1".to_string(),
                text: "What is your goal?".to_string(),
                answer: "Reach new readers".to_string(),
            }],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn save_then_fetch_round_trips_the_draft_fields() {
        let state = test_state(StateOverrides::default());
        let user_id = Uuid::new_v4();

        let (status, created) = create_session_handler(
            State(state.clone()),
            Extension(user_id),
            Json(request("How remote work affects team culture")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let fetched = get_session_handler(
            State(state),
            Extension(user_id),
            Path(created.0.id),
        )
        .await
        .unwrap();

        assert_eq!(fetched.0.user_id, user_id);
        assert_eq!(fetched.0.content_type, "Blog Post");
        assert_eq!(fetched.0.idea, "How remote work affects team culture");
        assert_eq!(fetched.0.title, "How remote work affects team culture");
    }

    #[tokio::test(start_paused = true)]
    async fn long_ideas_are_truncated_into_the_title() {
        let state = test_state(StateOverrides::default());
        let user_id = Uuid::new_v4();
        let idea = "a".repeat(80);

        let (_, created) =
            create_session_handler(State(state), Extension(user_id), Json(request(&idea)))
                .await
                .unwrap();
        assert_eq!(created.0.title.chars().count(), 53);
        assert!(created.0.title.ends_with("..."));
    }

    #[tokio::test(start_paused = true)]
    async fn cross_user_delete_is_refused_and_leaves_the_document() {
        let db = Arc::new(MockDb::new());
        let state = test_state(StateOverrides {
            db: Some(db.clone()),
            ..Default::default()
        });
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();

        let (_, created) = create_session_handler(
            State(state.clone()),
            Extension(owner),
            Json(request("remote work")),
        )
        .await
        .unwrap();
        let session_id = created.0.id;

        let failure = delete_session_handler(State(state.clone()), Extension(intruder), Path(session_id))
            .await
            .err()
            .unwrap();
        assert_eq!(failure.status, StatusCode::FORBIDDEN);

        let stored = db.stored_session(session_id).unwrap();
        assert_eq!(stored.idea, "remote work");

        // The owner can still delete it.
        let status = delete_session_handler(State(state), Extension(owner), Path(session_id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(db.stored_session(session_id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn listing_only_returns_the_callers_sessions() {
        let state = test_state(StateOverrides::default());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        create_session_handler(State(state.clone()), Extension(alice), Json(request("alice's idea")))
            .await
            .unwrap();

        let sessions = list_sessions_handler(State(state.clone()), Extension(alice))
            .await
            .unwrap();
        assert_eq!(sessions.0.len(), 1);
        assert_eq!(sessions.0[0].idea, "alice's idea");

        // Bob's empty list exhausts the backoff and comes back empty.
        let sessions = list_sessions_handler(State(state), Extension(bob)).await.unwrap();
        assert!(sessions.0.is_empty());
    }

    #[tokio::test]
    async fn regeneration_replaces_content_and_source() {
        use crate::adapters::generation::test_support::ScriptedProvider;
        use deep_content_core::domain::ContentSource;

        let db = Arc::new(MockDb::new());
        let state = test_state(StateOverrides {
            db: Some(db.clone()),
            content_primary: Some(Arc::new(ScriptedProvider::ok(
                ContentSource::Anthropic,
                "regenerated content",
            ))),
            ..Default::default()
        });
        let user_id = Uuid::new_v4();

        let (_, created) = create_session_handler(
            State(state.clone()),
            Extension(user_id),
            Json(request("remote work")),
        )
        .await
        .unwrap();

        let response = regenerate_session_handler(
            State(state),
            Extension(user_id),
            Path(created.0.id),
            Json(RegenerateRequest {
                feedback: Some("make it shorter".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.content, "regenerated content");
        assert_eq!(response.0.source, ContentSource::Anthropic);

        let stored = db.stored_session(created.0.id).unwrap();
        assert_eq!(stored.generated_content, "regenerated content");
        assert_eq!(stored.content_source, Some(ContentSource::Anthropic));
        // Inputs are preserved for the next regeneration.
        assert_eq!(stored.idea, "remote work");
        assert_eq!(stored.questions.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repair_all_reports_the_repaired_count() {
        let state = test_state(StateOverrides::default());
        let user_id = Uuid::new_v4();

        create_session_handler(State(state.clone()), Extension(user_id), Json(request("one")))
            .await
            .unwrap();
        create_session_handler(State(state.clone()), Extension(user_id), Json(request("two")))
            .await
            .unwrap();

        let response = repair_all_handler(State(state), Extension(user_id))
            .await
            .unwrap();
        assert_eq!(response.0.repaired, 2);
    }

    #[tokio::test]
    async fn prefetch_is_accepted_even_without_a_provider() {
        let state = test_state(StateOverrides::default());
        let status = prefetch_questions_handler(
            State(state),
            Extension(Uuid::new_v4()),
            Json(ContentDraft::default()),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }
}
