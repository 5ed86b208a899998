//! API request and response models
//!
//! Wire format is camelCase; enum-valued fields travel as their
//! canonical strings (`"IN_PROGRESS"`, `"HIGH"`, `"manager"`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use dtrack_domain::entities::{Comment, DefectListItem, Project, User};

/// Login request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    /// Defaults to `engineer` when omitted
    pub role: Option<String>,
}

/// Refresh-token request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Logout request; revokes one refresh token, or every token of the
/// current user when omitted
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Password change request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Authentication response
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserInfo,
}

/// User information
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

/// Project creation request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub stage: Option<String>,
    #[serde(default)]
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Project response
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub stage: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id.to_string(),
            name: project.name,
            stage: project.stage,
            description: project.description,
            start_date: project.start_date,
            end_date: project.end_date,
            created_by: project.created_by.to_string(),
            created_at: project.created_at,
        }
    }
}

/// Project list response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectListResponse {
    pub items: Vec<ProjectResponse>,
}

/// Defect listing query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListDefectsQuery {
    /// Filter by status; unrecognized values are ignored
    pub status: Option<String>,
    /// Filter by priority; unrecognized values are ignored
    pub priority: Option<String>,
    /// Filter by owning project id
    pub project_id: Option<String>,
    /// Result cap, clamped to (0, 100]; defaults to 20
    pub limit: Option<i64>,
}

/// Defect creation request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDefectRequest {
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub assignee_id: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Status change request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Comment creation request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub body: String,
}

/// Row in the defect list view
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefectListItemResponse {
    pub id: String,
    pub project_id: String,
    pub project: String,
    pub title: String,
    pub priority: Option<String>,
    pub status: String,
    pub assignee_id: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl From<DefectListItem> for DefectListItemResponse {
    fn from(item: DefectListItem) -> Self {
        Self {
            id: item.id.to_string(),
            project_id: item.project_id.to_string(),
            project: item.project_name,
            title: item.title,
            priority: item.priority.map(|p| p.as_str().to_string()),
            status: item.status.as_str().to_string(),
            assignee_id: item.assignee_id.map(|id| id.to_string()),
            assignee: item.assignee_name,
            due_date: item.due_date,
            updated_at: item.updated_at,
        }
    }
}

/// Defect list response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DefectListResponse {
    pub items: Vec<DefectListItemResponse>,
}

/// Full defect aggregate response
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefectResponse {
    pub id: String,
    pub project_id: String,
    pub project: String,
    pub title: String,
    pub description: String,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub status: String,
    pub assignee_id: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub attachments: Vec<AttachmentResponse>,
    pub comments: Vec<CommentResponse>,
}

/// Comment response
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub author_id: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            author_id: comment.author_id.to_string(),
            author: comment.author_name,
            body: comment.body,
            created_at: comment.created_at,
        }
    }
}

/// Comment list response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentListResponse {
    pub items: Vec<CommentResponse>,
}

/// Attachment response
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
    pub download_url: String,
}

/// API health response
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
