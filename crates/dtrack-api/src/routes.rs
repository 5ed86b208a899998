//! API route definitions

use std::time::Duration;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    handlers::{auth, defects, health, projects},
    middleware,
    state::AppState,
};

/// Routes reachable without a bearer token
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::health_check))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/refresh", post(auth::refresh))
}

/// Routes behind the authentication middleware
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/password", post(auth::change_password))
        .route(
            "/api/v1/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/v1/defects",
            get(defects::list_defects).post(defects::create_defect),
        )
        .route("/api/v1/defects/:id", get(defects::get_defect))
        .route("/api/v1/defects/:id/status", patch(defects::update_status))
        .route(
            "/api/v1/defects/:id/comments",
            get(defects::list_comments).post(defects::add_comment),
        )
        .route(
            "/api/v1/defects/:id/attachments",
            post(defects::upload_attachment),
        )
        .route(
            "/api/v1/defects/:id/attachments/:attachment_id",
            get(defects::download_attachment),
        )
        .route_layer(from_fn_with_state(state, middleware::require_auth))
}

/// Swagger UI routes
fn swagger_routes() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// The complete application router
pub fn api_routes(state: AppState, request_timeout: Duration) -> Router {
    public_routes()
        .merge(protected_routes(state.clone()))
        .merge(swagger_routes())
        .layer(from_fn(middleware::request_logging))
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::refresh,
        auth::logout,
        auth::change_password,
        projects::list_projects,
        projects::create_project,
        defects::list_defects,
        defects::create_defect,
        defects::get_defect,
        defects::update_status,
        defects::list_comments,
        defects::add_comment,
        defects::upload_attachment,
        defects::download_attachment,
    ),
    components(schemas(
        crate::models::LoginRequest,
        crate::models::RegisterRequest,
        crate::models::RefreshRequest,
        crate::models::LogoutRequest,
        crate::models::ChangePasswordRequest,
        crate::models::AuthResponse,
        crate::models::UserInfo,
        crate::models::CreateProjectRequest,
        crate::models::ProjectResponse,
        crate::models::ProjectListResponse,
        crate::models::CreateDefectRequest,
        crate::models::UpdateStatusRequest,
        crate::models::CreateCommentRequest,
        crate::models::DefectResponse,
        crate::models::DefectListItemResponse,
        crate::models::DefectListResponse,
        crate::models::CommentResponse,
        crate::models::CommentListResponse,
        crate::models::AttachmentResponse,
        crate::models::HealthResponse,
    )),
    info(
        title = "DTrack API",
        version = "0.1.0",
        description = "Defect tracking with a managed status lifecycle, role-based transitions, comments and attachments"
    )
)]
struct ApiDoc;
