//! Defect aggregate manager
//!
//! Owns defect creation, retrieval and listing, the status-change
//! workflow with its role gate and audit side effect, and the
//! per-item validation rules for comments and attachments.

use std::sync::Arc;

use crate::{
    entities::{
        Attachment, AttachmentCreate, Comment, Defect, DefectCreate, DefectFilter, DefectListItem,
        DefectQuery, NewComment, NewDefect, User,
    },
    errors::{DomainError, DomainResult},
    repositories::{DefectRepository, ProjectRepository, UserRepository},
    value_objects::{AttachmentId, DefectId, DefectStatus, Priority, UserId},
    workflow,
};

/// Effective limit when the caller supplies none, zero, a negative
/// value, or anything above [`MAX_LIST_LIMIT`]
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Hard cap on listing results; there is no pagination cursor
pub const MAX_LIST_LIMIT: i64 = 100;

/// Display name substituted when the comment author cannot be resolved
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

/// Defect aggregate manager
pub struct DefectService {
    repo: Arc<dyn DefectRepository>,
    projects: Arc<dyn ProjectRepository>,
    users: Arc<dyn UserRepository>,
}

impl DefectService {
    pub fn new(
        repo: Arc<dyn DefectRepository>,
        projects: Arc<dyn ProjectRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            repo,
            projects,
            users,
        }
    }

    /// List defects. Unrecognized status/priority filter values mean
    /// "no filter on that field"; the limit is clamped to
    /// (0, [`MAX_LIST_LIMIT`]] with [`DEFAULT_LIST_LIMIT`] as fallback.
    pub async fn list(&self, filter: DefectFilter) -> DomainResult<Vec<DefectListItem>> {
        let limit = if filter.limit <= 0 || filter.limit > MAX_LIST_LIMIT {
            DEFAULT_LIST_LIMIT
        } else {
            filter.limit
        };

        let query = DefectQuery {
            project: filter.project,
            status: filter.status.as_deref().and_then(DefectStatus::normalize),
            priority: filter.priority.as_deref().and_then(Priority::normalize),
            limit,
        };

        self.repo.list(query).await
    }

    /// Create a defect. Manager-only; the referenced project must
    /// exist; the new defect always starts in status NEW regardless of
    /// input.
    pub async fn create(&self, actor: &User, payload: DefectCreate) -> DomainResult<Defect> {
        if !actor.role.can_create_defects() {
            return Err(DomainError::authorization(
                "only a manager can create defects",
            ));
        }

        let project = self.projects.get(&payload.project_id).await?;
        let priority = normalize_priority_field("priority", payload.priority.as_deref())?;
        let severity = normalize_priority_field("severity", payload.severity.as_deref())?;

        let assignee_name = match payload.assignee_id {
            Some(assignee) => self
                .users
                .get_by_id(&assignee)
                .await
                .ok()
                .map(|user| user.full_name),
            None => None,
        };

        self.repo
            .create(NewDefect {
                project_id: project.id,
                project_name: project.name,
                title: payload.title,
                description: payload.description,
                priority,
                severity,
                assignee_id: payload.assignee_id,
                assignee_name,
                due_date: payload.due_date,
                created_by: actor.id,
            })
            .await
    }

    /// Load the full aggregate
    pub async fn get(&self, id: &DefectId) -> DomainResult<Defect> {
        self.repo.get(id).await
    }

    /// Move a defect to a requested status.
    ///
    /// A request for the current status is an accepted no-op: it
    /// short-circuits before the edge check, writes nothing and records
    /// no history. Otherwise the role gate runs for elevated targets,
    /// the transition policy validates the edge, the status is persisted
    /// through the conditional update guarded by the status read here,
    /// and one history entry is appended best-effort. The returned
    /// aggregate is a fresh re-read, not the locally observed one.
    pub async fn update_status(
        &self,
        id: &DefectId,
        actor: &User,
        requested: &str,
    ) -> DomainResult<Defect> {
        let next = DefectStatus::normalize(requested).ok_or_else(|| {
            DomainError::validation("status", format!("unknown status `{}`", requested.trim()))
        })?;

        let defect = self.repo.get(id).await?;

        if defect.status == next {
            return Ok(defect);
        }

        // Role gate first: an engineer asking for CLOSED is told "not
        // allowed" even when the edge itself would also be illegal.
        if workflow::requires_manager(next) && !actor.role.can_close_or_cancel() {
            return Err(DomainError::authorization(format!(
                "status {next} can only be set by a manager"
            )));
        }

        if !workflow::can_transition(defect.status, next) {
            return Err(DomainError::TransitionDenied {
                from: defect.status,
                to: next,
            });
        }

        self.repo
            .update_status(id, next, &actor.id, defect.status)
            .await?;

        // Best-effort audit: a failed history append must never undo or
        // fail the transition itself.
        if let Err(err) = self
            .repo
            .append_history(id, &actor.id, "status", defect.status.as_str(), next.as_str())
            .await
        {
            tracing::warn!(defect = %id, error = %err, "status history append failed");
        }

        self.repo.get(id).await
    }

    /// Add a comment. The author display name is resolved best-effort;
    /// a failed lookup substitutes [`UNKNOWN_AUTHOR`] instead of
    /// failing the operation.
    pub async fn add_comment(
        &self,
        defect_id: &DefectId,
        author: &UserId,
        body: &str,
    ) -> DomainResult<Comment> {
        let body = body.trim();
        if body.is_empty() {
            return Err(DomainError::validation("body", "comment body is empty"));
        }

        let author_name = match self.users.get_by_id(author).await {
            Ok(user) => user.full_name,
            Err(err) => {
                tracing::debug!(author = %author, error = %err, "comment author lookup failed");
                UNKNOWN_AUTHOR.to_string()
            }
        };

        self.repo
            .add_comment(NewComment {
                defect_id: *defect_id,
                author_id: *author,
                author_name,
                body: body.to_string(),
            })
            .await
    }

    /// Comments in chronological ascending order; empty vec if none
    pub async fn list_comments(&self, defect_id: &DefectId) -> DomainResult<Vec<Comment>> {
        self.repo.list_comments(defect_id).await
    }

    /// Record attachment metadata. The bytes already live with the
    /// storage collaborator.
    pub async fn add_attachment(&self, payload: AttachmentCreate) -> DomainResult<Attachment> {
        if payload.size_bytes <= 0 {
            return Err(DomainError::validation("size_bytes", "attachment is empty"));
        }
        self.repo.add_attachment(payload).await
    }

    /// Attachments in upload-time descending order
    pub async fn list_attachments(&self, defect_id: &DefectId) -> DomainResult<Vec<Attachment>> {
        self.repo.list_attachments(defect_id).await
    }

    pub async fn get_attachment(
        &self,
        defect_id: &DefectId,
        attachment_id: &AttachmentId,
    ) -> DomainResult<Attachment> {
        self.repo.get_attachment(defect_id, attachment_id).await
    }
}

/// Canonicalize a priority/severity creation field.
///
/// Absent or blank stays `None`; an unrecognized non-empty value is a
/// validation failure rather than being silently dropped.
fn normalize_priority_field(
    field: &'static str,
    raw: Option<&str>,
) -> DomainResult<Option<Priority>> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => Priority::normalize(value).map(Some).ok_or_else(|| {
            DomainError::validation(field, format!("unknown value `{}`", value.trim()))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_priority_field_accepts_known_values() {
        assert_eq!(
            normalize_priority_field("priority", Some("  high ")).unwrap(),
            Some(Priority::High)
        );
        assert_eq!(normalize_priority_field("priority", None).unwrap(), None);
        assert_eq!(
            normalize_priority_field("priority", Some("   ")).unwrap(),
            None
        );
    }

    #[test]
    fn test_normalize_priority_field_rejects_unknown_values() {
        let err = normalize_priority_field("severity", Some("urgent")).unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "severity"));
    }
}
