//! Project API handlers

use axum::{extract::State, http::StatusCode, Extension, Json};

use dtrack_domain::entities::ProjectCreate;

use crate::{
    error::ApiResult,
    middleware::CurrentUser,
    models::{CreateProjectRequest, ProjectListResponse, ProjectResponse},
    state::AppState,
};

/// List projects
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "All projects", body = ProjectListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<ProjectListResponse>> {
    let projects = state.projects.list().await?;
    Ok(Json(ProjectListResponse {
        items: projects.into_iter().map(ProjectResponse::from).collect(),
    }))
}

/// Create a project (manager only)
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not a manager")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let project = state
        .projects
        .create(
            &user,
            ProjectCreate {
                name: request.name,
                stage: request.stage,
                description: request.description,
                start_date: request.start_date,
                end_date: request.end_date,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}
