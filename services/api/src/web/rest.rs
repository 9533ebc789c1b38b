//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification served through
//! Swagger UI. Handlers carrying `#[utoipa::path]` annotations are listed
//! here; the rest of the surface is intentionally undocumented.

use utoipa::OpenApi;

use crate::web::auth::{AuthResponse, LoginRequest, SignupRequest};
use crate::web::chat::{ChatProvider, ChatResponse};
use crate::web::sessions::{RepairAllResponse, RepairResponse};
use crate::web::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        crate::web::providers::questions_handler,
        crate::web::providers::generate_handler,
        crate::web::sessions::create_session_handler,
        crate::web::sessions::list_sessions_handler,
        crate::web::chat::chat_handler,
    ),
    components(
        schemas(
            SignupRequest,
            LoginRequest,
            AuthResponse,
            ChatProvider,
            ChatResponse,
            RepairResponse,
            RepairAllResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "Deep Content API", description = "API endpoints for the AI content-generation workflow.")
    )
)]
pub struct ApiDoc;
