//! Defect aggregate and its read/write payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Attachment, Comment};
use crate::value_objects::{DefectId, DefectStatus, Priority, ProjectId, UserId};

/// Full defect aggregate: the defect row plus its owned comments
/// (chronological ascending) and attachments (upload time descending).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defect {
    pub id: DefectId,
    pub project_id: ProjectId,
    pub project_name: String,
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub severity: Option<Priority>,
    pub status: DefectStatus,
    pub assignee_id: Option<UserId>,
    pub assignee_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
}

/// Read-only projection of a defect for tabular views.
///
/// No description and no nested collections; identity and status fields
/// stay structurally consistent with [`Defect`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectListItem {
    pub id: DefectId,
    pub project_id: ProjectId,
    pub project_name: String,
    pub title: String,
    pub priority: Option<Priority>,
    pub status: DefectStatus,
    pub assignee_id: Option<UserId>,
    pub assignee_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload as received from the transport layer.
///
/// Priority and severity arrive as free text and are canonicalized by
/// the defect service before anything is persisted.
#[derive(Debug, Clone, Default)]
pub struct DefectCreate {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub assignee_id: Option<UserId>,
    pub due_date: Option<NaiveDate>,
}

/// A validated, normalized defect ready to persist.
///
/// Built exclusively by the defect service; the status of a new defect
/// is always [`DefectStatus::New`] and is set by the repository.
#[derive(Debug, Clone)]
pub struct NewDefect {
    pub project_id: ProjectId,
    pub project_name: String,
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub severity: Option<Priority>,
    pub assignee_id: Option<UserId>,
    pub assignee_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_by: UserId,
}

/// Optional filters for defect listing, as received from the transport
/// layer. Status/priority are free text; unrecognized values mean
/// "no filter on that field".
#[derive(Debug, Clone, Default)]
pub struct DefectFilter {
    pub project: Option<ProjectId>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub limit: i64,
}

/// Normalized listing query handed to the repository: typed filter
/// values and a limit already clamped to the legal range.
#[derive(Debug, Clone)]
pub struct DefectQuery {
    pub project: Option<ProjectId>,
    pub status: Option<DefectStatus>,
    pub priority: Option<Priority>,
    pub limit: i64,
}
