//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        anthropic::AnthropicAdapter, db::DbAdapter, generation::FallbackGenerator,
        openai_llm::OpenAiAdapter, questions::QuestionGenerator, supadata::SupadataAdapter,
    },
    config::Config,
    error::ApiError,
    prefetch::QuestionPrefetcher,
    web::{
        auth::{login_handler, logout_handler, signup_handler},
        chat::chat_handler,
        conversations::{
            delete_conversation_handler, get_conversation_handler, list_conversations_handler,
            save_conversation_handler,
        },
        middleware::require_auth,
        providers::{
            generate_handler, questions_handler, research_handler, web_handler, youtube_handler,
        },
        rest::ApiDoc,
        sessions::{
            create_session_handler, delete_session_handler, get_session_handler,
            list_sessions_handler, prefetch_questions_handler, regenerate_session_handler,
            repair_all_handler, repair_session_handler,
        },
        state::AppState,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use deep_content_core::ports::{TextCompletionService, TranscriptService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Provider Adapters (each optional) ---
    let anthropic_chat: Option<Arc<dyn TextCompletionService>> =
        config.anthropic_api_key.as_ref().map(|key| {
            Arc::new(AnthropicAdapter::new(
                key.clone(),
                config.anthropic_model.clone(),
                4000,
                None,
            )) as Arc<dyn TextCompletionService>
        });
    let question_generator = config.anthropic_api_key.as_ref().map(|key| {
        Arc::new(QuestionGenerator::new(Arc::new(AnthropicAdapter::new(
            key.clone(),
            config.anthropic_questions_model.clone(),
            1000,
            Some(0.7),
        ))))
    });

    let openai_client = config
        .openai_api_key
        .as_ref()
        .map(|key| Client::with_config(OpenAIConfig::new().with_api_key(key)));
    let openai_chat: Option<Arc<dyn TextCompletionService>> = openai_client.as_ref().map(|client| {
        Arc::new(OpenAiAdapter::new(
            client.clone(),
            config.openai_model.clone(),
            4000,
            Some(0.7),
        )) as Arc<dyn TextCompletionService>
    });
    let openai_research: Option<Arc<dyn TextCompletionService>> =
        openai_client.as_ref().map(|client| {
            Arc::new(OpenAiAdapter::new(
                client.clone(),
                config.openai_model.clone(),
                2500,
                Some(0.3),
            )) as Arc<dyn TextCompletionService>
        });

    let transcripts: Option<Arc<dyn TranscriptService>> =
        config.supadata_api_key.as_ref().map(|key| {
            Arc::new(SupadataAdapter::new(key.clone())) as Arc<dyn TranscriptService>
        });

    let content_generator =
        FallbackGenerator::new(anthropic_chat.clone(), openai_chat.clone());
    let research_generator = FallbackGenerator::new(openai_research, None);

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        question_generator,
        content_generator,
        research_generator,
        chat_anthropic: anthropic_chat,
        chat_openai: openai_chat,
        transcripts,
        prefetcher: Arc::new(QuestionPrefetcher::new()),
    });

    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/anthropic/questions", post(questions_handler))
        .route("/api/anthropic/generate", post(generate_handler))
        .route("/api/perplexity/research", post(research_handler))
        .route("/api/supadata/youtube", post(youtube_handler))
        .route("/api/supadata/web", post(web_handler))
        .route(
            "/api/sessions",
            post(create_session_handler).get(list_sessions_handler),
        )
        .route(
            "/api/sessions/prefetch-questions",
            post(prefetch_questions_handler),
        )
        .route("/api/sessions/repair-all", post(repair_all_handler))
        .route(
            "/api/sessions/{id}",
            get(get_session_handler)
                .put(regenerate_session_handler)
                .delete(delete_session_handler),
        )
        .route("/api/sessions/{id}/repair", post(repair_session_handler))
        .route("/api/chat", post(chat_handler))
        .route(
            "/api/conversations",
            post(save_conversation_handler).get(list_conversations_handler),
        )
        .route(
            "/api/conversations/{id}",
            get(get_conversation_handler).delete(delete_conversation_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
