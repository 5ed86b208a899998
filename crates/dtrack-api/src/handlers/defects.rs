//! Defect API handlers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};

use dtrack_domain::{
    entities::{Attachment, AttachmentCreate, Defect, DefectCreate, DefectFilter},
    errors::DomainError,
    value_objects::{AttachmentId, DefectId, ProjectId, UserId},
};
use dtrack_storage::StorageProvider;

use crate::{
    error::{ApiError, ApiResult},
    middleware::CurrentUser,
    models::{
        AttachmentResponse, CommentListResponse, CommentResponse, CreateCommentRequest,
        CreateDefectRequest, DefectListItemResponse, DefectListResponse, DefectResponse,
        ListDefectsQuery, UpdateStatusRequest,
    },
    state::AppState,
};

/// List defects
#[utoipa::path(
    get,
    path = "/api/v1/defects",
    params(ListDefectsQuery),
    responses(
        (status = 200, description = "Defects matching the filters", body = DefectListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_defects(
    State(state): State<AppState>,
    Query(query): Query<ListDefectsQuery>,
) -> ApiResult<Json<DefectListResponse>> {
    let filter = DefectFilter {
        // An unparseable project id cannot match anything that exists;
        // treat it like an unrecognized enum filter and ignore it.
        project: query
            .project_id
            .as_deref()
            .and_then(|raw| ProjectId::parse(raw).ok()),
        status: query.status,
        priority: query.priority,
        limit: query.limit.unwrap_or(0),
    };

    let items = state.defects.list(filter).await?;
    Ok(Json(DefectListResponse {
        items: items.into_iter().map(DefectListItemResponse::from).collect(),
    }))
}

/// Create a defect (manager only)
#[utoipa::path(
    post,
    path = "/api/v1/defects",
    request_body = CreateDefectRequest,
    responses(
        (status = 201, description = "Defect created", body = DefectResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not a manager"),
        (status = 404, description = "Referenced project does not exist")
    )
)]
pub async fn create_defect(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateDefectRequest>,
) -> ApiResult<(StatusCode, Json<DefectResponse>)> {
    let project_id = ProjectId::parse(&request.project_id)
        .map_err(|_| DomainError::not_found("project", &request.project_id))?;
    let assignee_id = match request.assignee_id.as_deref().filter(|raw| !raw.is_empty()) {
        Some(raw) => Some(
            UserId::parse(raw)
                .map_err(|_| ApiError::BadRequest(format!("invalid assignee id `{raw}`")))?,
        ),
        None => None,
    };

    let defect = state
        .defects
        .create(
            &user,
            DefectCreate {
                project_id,
                title: request.title,
                description: request.description,
                priority: request.priority,
                severity: request.severity,
                assignee_id,
                due_date: request.due_date,
            },
        )
        .await?;

    let response = defect_response(state.storage.as_ref(), defect).await;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Fetch one defect with nested comments and attachments
#[utoipa::path(
    get,
    path = "/api/v1/defects/{id}",
    params(("id" = String, Path, description = "Defect ID")),
    responses(
        (status = 200, description = "Defect aggregate", body = DefectResponse),
        (status = 404, description = "Defect not found")
    )
)]
pub async fn get_defect(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DefectResponse>> {
    let id = parse_defect_id(&id)?;
    let defect = state.defects.get(&id).await?;
    Ok(Json(defect_response(state.storage.as_ref(), defect).await))
}

/// Change a defect's status
#[utoipa::path(
    patch,
    path = "/api/v1/defects/{id}/status",
    params(("id" = String, Path, description = "Defect ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Refreshed defect aggregate", body = DefectResponse),
        (status = 400, description = "Unknown status value"),
        (status = 403, description = "Transition requires the manager role"),
        (status = 404, description = "Defect not found"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Json<DefectResponse>> {
    let id = parse_defect_id(&id)?;
    let defect = state.defects.update_status(&id, &user, &request.status).await?;
    Ok(Json(defect_response(state.storage.as_ref(), defect).await))
}

/// List a defect's comments
#[utoipa::path(
    get,
    path = "/api/v1/defects/{id}/comments",
    params(("id" = String, Path, description = "Defect ID")),
    responses(
        (status = 200, description = "Comments in chronological order", body = CommentListResponse)
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CommentListResponse>> {
    let id = parse_defect_id(&id)?;
    let comments = state.defects.list_comments(&id).await?;
    Ok(Json(CommentListResponse {
        items: comments.into_iter().map(CommentResponse::from).collect(),
    }))
}

/// Add a comment to a defect
#[utoipa::path(
    post,
    path = "/api/v1/defects/{id}/comments",
    params(("id" = String, Path, description = "Defect ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Empty comment body"),
        (status = 404, description = "Defect not found")
    )
)]
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let id = parse_defect_id(&id)?;
    let comment = state.defects.add_comment(&id, &user.id, &request.body).await?;
    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// Upload an attachment (multipart `file` field)
#[utoipa::path(
    post,
    path = "/api/v1/defects/{id}/attachments",
    params(("id" = String, Path, description = "Defect ID")),
    responses(
        (status = 201, description = "Attachment stored", body = AttachmentResponse),
        (status = 400, description = "Missing or unreadable file field"),
        (status = 404, description = "Defect not found")
    )
)]
pub async fn upload_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<AttachmentResponse>)> {
    let id = parse_defect_id(&id)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or("attachment")
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::BadRequest(err.to_string()))?;

        let stored = state
            .storage
            .save(&bytes, &filename, &content_type)
            .await?;

        let attachment = state
            .defects
            .add_attachment(AttachmentCreate {
                defect_id: id,
                filename,
                content_type,
                size_bytes: stored.size,
                storage_key: stored.key,
            })
            .await?;

        let response = attachment_response(state.storage.as_ref(), &id, attachment).await;
        return Ok((StatusCode::CREATED, Json(response)));
    }

    Err(ApiError::BadRequest("file field is required".to_string()))
}

/// Download an attachment's bytes
#[utoipa::path(
    get,
    path = "/api/v1/defects/{id}/attachments/{attachment_id}",
    params(
        ("id" = String, Path, description = "Defect ID"),
        ("attachment_id" = String, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "Attachment bytes"),
        (status = 400, description = "Direct download unsupported by the storage backend"),
        (status = 404, description = "Attachment not found")
    )
)]
pub async fn download_attachment(
    State(state): State<AppState>,
    Path((id, attachment_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let id = parse_defect_id(&id)?;
    let attachment_id = AttachmentId::parse(&attachment_id)
        .map_err(|_| DomainError::not_found("attachment", &attachment_id))?;

    let attachment = state.defects.get_attachment(&id, &attachment_id).await?;

    let path = state.storage.path_for(&attachment.storage_key).ok_or_else(|| {
        ApiError::BadRequest(
            "direct download is not available for the configured storage backend".to_string(),
        )
    })?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, attachment.content_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", attachment.filename),
        ),
    ];
    Ok((headers, bytes).into_response())
}

fn parse_defect_id(raw: &str) -> Result<DefectId, DomainError> {
    DefectId::parse(raw).map_err(|_| DomainError::not_found("defect", raw))
}

/// Download URL for an attachment: a presigned URL when the backend can
/// issue one, otherwise the stable same-origin endpoint.
async fn download_url(
    storage: &dyn StorageProvider,
    defect_id: &DefectId,
    attachment: &Attachment,
) -> String {
    match storage.presign(&attachment.storage_key).await {
        Ok(Some(url)) => url,
        Ok(None) => same_origin_url(defect_id, attachment),
        Err(err) => {
            tracing::debug!(error = %err, "presign failed, falling back to direct endpoint");
            same_origin_url(defect_id, attachment)
        }
    }
}

fn same_origin_url(defect_id: &DefectId, attachment: &Attachment) -> String {
    format!("/api/v1/defects/{}/attachments/{}", defect_id, attachment.id)
}

async fn attachment_response(
    storage: &dyn StorageProvider,
    defect_id: &DefectId,
    attachment: Attachment,
) -> AttachmentResponse {
    let url = download_url(storage, defect_id, &attachment).await;
    AttachmentResponse {
        id: attachment.id.to_string(),
        filename: attachment.filename,
        content_type: attachment.content_type,
        size_bytes: attachment.size_bytes,
        storage_key: attachment.storage_key,
        uploaded_at: attachment.uploaded_at,
        download_url: url,
    }
}

async fn defect_response(storage: &dyn StorageProvider, defect: Defect) -> DefectResponse {
    let mut attachments = Vec::with_capacity(defect.attachments.len());
    for attachment in defect.attachments {
        attachments.push(attachment_response(storage, &defect.id, attachment).await);
    }

    DefectResponse {
        id: defect.id.to_string(),
        project_id: defect.project_id.to_string(),
        project: defect.project_name,
        title: defect.title,
        description: defect.description,
        priority: defect.priority.map(|p| p.as_str().to_string()),
        severity: defect.severity.map(|p| p.as_str().to_string()),
        status: defect.status.as_str().to_string(),
        assignee_id: defect.assignee_id.map(|id| id.to_string()),
        assignee: defect.assignee_name,
        due_date: defect.due_date,
        created_by: defect.created_by.to_string(),
        created_at: defect.created_at,
        updated_at: defect.updated_at,
        attachments,
        comments: defect.comments.into_iter().map(CommentResponse::from).collect(),
    }
}
