//! In-memory defect repository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;

use dtrack_domain::{
    entities::{
        Attachment, AttachmentCreate, Comment, Defect, DefectListItem, DefectQuery, HistoryEntry,
        NewComment, NewDefect,
    },
    errors::{DomainError, DomainResult},
    repositories::DefectRepository,
    value_objects::{AttachmentId, CommentId, DefectId, DefectStatus, Priority, ProjectId, UserId},
};

/// Defect row without its owned collections; the aggregate is assembled
/// on read.
#[derive(Debug, Clone)]
struct DefectRecord {
    id: DefectId,
    project_id: ProjectId,
    project_name: String,
    title: String,
    description: String,
    priority: Option<Priority>,
    severity: Option<Priority>,
    status: DefectStatus,
    assignee_id: Option<UserId>,
    assignee_name: Option<String>,
    due_date: Option<NaiveDate>,
    created_by: UserId,
    updated_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Thread-safe in-memory implementation of [`DefectRepository`]
#[derive(Debug, Default)]
pub struct InMemoryDefectRepository {
    defects: RwLock<HashMap<DefectId, DefectRecord>>,
    comments: RwLock<Vec<Comment>>,
    attachments: RwLock<Vec<Attachment>>,
    history: RwLock<Vec<HistoryEntry>>,
}

impl InMemoryDefectRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored defects (for testing)
    pub fn count(&self) -> usize {
        self.defects.read().len()
    }

    /// Last recorded modifier of a defect (for testing)
    pub fn last_modifier(&self, id: &DefectId) -> Option<UserId> {
        self.defects.read().get(id).map(|record| record.updated_by)
    }

    /// Audit entries recorded for one defect, in append order (for
    /// testing)
    pub fn history_for(&self, defect_id: &DefectId) -> Vec<HistoryEntry> {
        self.history
            .read()
            .iter()
            .filter(|entry| entry.defect_id == *defect_id)
            .cloned()
            .collect()
    }

    fn assemble(&self, record: &DefectRecord) -> Defect {
        let mut comments: Vec<Comment> = self
            .comments
            .read()
            .iter()
            .filter(|comment| comment.defect_id == record.id)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| comment.created_at);

        let mut attachments: Vec<Attachment> = self
            .attachments
            .read()
            .iter()
            .filter(|attachment| attachment.defect_id == record.id)
            .cloned()
            .collect();
        attachments.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

        Defect {
            id: record.id,
            project_id: record.project_id,
            project_name: record.project_name.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            priority: record.priority,
            severity: record.severity,
            status: record.status,
            assignee_id: record.assignee_id,
            assignee_name: record.assignee_name.clone(),
            due_date: record.due_date,
            created_by: record.created_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
            comments,
            attachments,
        }
    }

    fn require(&self, id: &DefectId) -> DomainResult<DefectRecord> {
        self.defects
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("defect", id))
    }
}

#[async_trait]
impl DefectRepository for InMemoryDefectRepository {
    async fn list(&self, query: DefectQuery) -> DomainResult<Vec<DefectListItem>> {
        let defects = self.defects.read();
        let mut records: Vec<&DefectRecord> = defects
            .values()
            .filter(|record| {
                query.project.map_or(true, |p| record.project_id == p)
                    && query.status.map_or(true, |s| record.status == s)
                    && query.priority.map_or(true, |p| record.priority == Some(p))
            })
            .collect();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(query.limit as usize);

        Ok(records
            .into_iter()
            .map(|record| DefectListItem {
                id: record.id,
                project_id: record.project_id,
                project_name: record.project_name.clone(),
                title: record.title.clone(),
                priority: record.priority,
                status: record.status,
                assignee_id: record.assignee_id,
                assignee_name: record.assignee_name.clone(),
                due_date: record.due_date,
                updated_at: record.updated_at,
            })
            .collect())
    }

    async fn create(&self, defect: NewDefect) -> DomainResult<Defect> {
        let now = Utc::now();
        let record = DefectRecord {
            id: DefectId::new(),
            project_id: defect.project_id,
            project_name: defect.project_name,
            title: defect.title,
            description: defect.description,
            priority: defect.priority,
            severity: defect.severity,
            status: DefectStatus::New,
            assignee_id: defect.assignee_id,
            assignee_name: defect.assignee_name,
            due_date: defect.due_date,
            created_by: defect.created_by,
            updated_by: defect.created_by,
            created_at: now,
            updated_at: now,
        };

        let created = self.assemble(&record);
        self.defects.write().insert(record.id, record);
        Ok(created)
    }

    async fn get(&self, id: &DefectId) -> DomainResult<Defect> {
        let record = self.require(id)?;
        Ok(self.assemble(&record))
    }

    async fn update_status(
        &self,
        id: &DefectId,
        status: DefectStatus,
        actor: &UserId,
        expected: DefectStatus,
    ) -> DomainResult<()> {
        let mut defects = self.defects.write();
        let record = defects
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("defect", id))?;

        if record.status != expected {
            return Err(DomainError::ConcurrencyConflict {
                resource: format!("defect {id} status"),
            });
        }

        record.status = status;
        record.updated_by = *actor;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn append_history(
        &self,
        defect_id: &DefectId,
        actor: &UserId,
        field: &str,
        old_value: &str,
        new_value: &str,
    ) -> DomainResult<()> {
        self.require(defect_id)?;
        self.history.write().push(HistoryEntry {
            defect_id: *defect_id,
            actor_id: *actor,
            field: field.to_string(),
            old_value: old_value.to_string(),
            new_value: new_value.to_string(),
            recorded_at: Utc::now(),
        });
        Ok(())
    }

    async fn add_comment(&self, comment: NewComment) -> DomainResult<Comment> {
        self.require(&comment.defect_id)?;
        let stored = Comment {
            id: CommentId::new(),
            defect_id: comment.defect_id,
            author_id: comment.author_id,
            author_name: comment.author_name,
            body: comment.body,
            created_at: Utc::now(),
        };
        self.comments.write().push(stored.clone());
        Ok(stored)
    }

    async fn list_comments(&self, defect_id: &DefectId) -> DomainResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .read()
            .iter()
            .filter(|comment| comment.defect_id == *defect_id)
            .cloned()
            .collect();
        comments.sort_by_key(|comment| comment.created_at);
        Ok(comments)
    }

    async fn add_attachment(&self, attachment: AttachmentCreate) -> DomainResult<Attachment> {
        self.require(&attachment.defect_id)?;
        let stored = Attachment {
            id: AttachmentId::new(),
            defect_id: attachment.defect_id,
            filename: attachment.filename,
            content_type: attachment.content_type,
            size_bytes: attachment.size_bytes,
            storage_key: attachment.storage_key,
            uploaded_at: Utc::now(),
        };
        self.attachments.write().push(stored.clone());
        Ok(stored)
    }

    async fn list_attachments(&self, defect_id: &DefectId) -> DomainResult<Vec<Attachment>> {
        let mut attachments: Vec<Attachment> = self
            .attachments
            .read()
            .iter()
            .filter(|attachment| attachment.defect_id == *defect_id)
            .cloned()
            .collect();
        attachments.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(attachments)
    }

    async fn get_attachment(
        &self,
        defect_id: &DefectId,
        attachment_id: &AttachmentId,
    ) -> DomainResult<Attachment> {
        self.attachments
            .read()
            .iter()
            .find(|attachment| {
                attachment.defect_id == *defect_id && attachment.id == *attachment_id
            })
            .cloned()
            .ok_or_else(|| DomainError::not_found("attachment", attachment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_defect(project_id: ProjectId, title: &str) -> NewDefect {
        NewDefect {
            project_id,
            project_name: "Billing".to_string(),
            title: title.to_string(),
            description: String::new(),
            priority: Some(Priority::High),
            severity: None,
            assignee_id: None,
            assignee_name: None,
            due_date: None,
            created_by: UserId::new(),
        }
    }

    #[tokio::test]
    async fn test_create_starts_in_new() {
        let repo = InMemoryDefectRepository::new();
        let defect = repo
            .create(new_defect(ProjectId::new(), "login fails"))
            .await
            .unwrap();

        assert_eq!(defect.status, DefectStatus::New);
        assert!(defect.comments.is_empty());
        assert!(defect.attachments.is_empty());
        assert_eq!(repo.count(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_defect() {
        let repo = InMemoryDefectRepository::new();
        let err = repo.get(&DefectId::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::EntityNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_project_and_status() {
        let repo = InMemoryDefectRepository::new();
        let project = ProjectId::new();
        let other = ProjectId::new();
        repo.create(new_defect(project, "a")).await.unwrap();
        repo.create(new_defect(project, "b")).await.unwrap();
        repo.create(new_defect(other, "c")).await.unwrap();

        let items = repo
            .list(DefectQuery {
                project: Some(project),
                status: Some(DefectStatus::New),
                priority: None,
                limit: 20,
            })
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.project_id == project));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_caps() {
        let repo = InMemoryDefectRepository::new();
        let project = ProjectId::new();
        for i in 0..5 {
            repo.create(new_defect(project, &format!("defect {i}")))
                .await
                .unwrap();
        }

        let items = repo
            .list(DefectQuery {
                project: None,
                status: None,
                priority: None,
                limit: 3,
            })
            .await
            .unwrap();

        assert_eq!(items.len(), 3);
        assert!(items.windows(2).all(|w| w[0].updated_at >= w[1].updated_at));
    }

    #[tokio::test]
    async fn test_conditional_update_rejects_stale_guard() {
        let repo = InMemoryDefectRepository::new();
        let defect = repo
            .create(new_defect(ProjectId::new(), "race"))
            .await
            .unwrap();
        let actor = UserId::new();

        repo.update_status(
            &defect.id,
            DefectStatus::InProgress,
            &actor,
            DefectStatus::New,
        )
        .await
        .unwrap();

        // Second writer still believes the defect is NEW.
        let err = repo
            .update_status(&defect.id, DefectStatus::Canceled, &actor, DefectStatus::New)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict { .. }));

        let current = repo.get(&defect.id).await.unwrap();
        assert_eq!(current.status, DefectStatus::InProgress);
        assert_eq!(repo.last_modifier(&defect.id), Some(actor));
    }

    #[tokio::test]
    async fn test_comments_sorted_ascending() {
        let repo = InMemoryDefectRepository::new();
        let defect = repo
            .create(new_defect(ProjectId::new(), "chatty"))
            .await
            .unwrap();
        let author = UserId::new();

        for body in ["first", "second", "third"] {
            repo.add_comment(NewComment {
                defect_id: defect.id,
                author_id: author,
                author_name: "Dana".to_string(),
                body: body.to_string(),
            })
            .await
            .unwrap();
        }

        let comments = repo.list_comments(&defect.id).await.unwrap();
        let bodies: Vec<&str> = comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_attachment_round_trip() {
        let repo = InMemoryDefectRepository::new();
        let defect = repo
            .create(new_defect(ProjectId::new(), "with file"))
            .await
            .unwrap();

        let attachment = repo
            .add_attachment(AttachmentCreate {
                defect_id: defect.id,
                filename: "trace.log".to_string(),
                content_type: "text/plain".to_string(),
                size_bytes: 1,
                storage_key: "ab/cd.log".to_string(),
            })
            .await
            .unwrap();

        let fetched = repo
            .get_attachment(&defect.id, &attachment.id)
            .await
            .unwrap();
        assert_eq!(fetched.filename, "trace.log");

        let err = repo
            .get_attachment(&DefectId::new(), &attachment.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EntityNotFound { .. }));
    }

    #[tokio::test]
    async fn test_history_appends_in_order() {
        let repo = InMemoryDefectRepository::new();
        let defect = repo
            .create(new_defect(ProjectId::new(), "audited"))
            .await
            .unwrap();
        let actor = UserId::new();

        repo.append_history(&defect.id, &actor, "status", "NEW", "IN_PROGRESS")
            .await
            .unwrap();
        repo.append_history(&defect.id, &actor, "status", "IN_PROGRESS", "IN_REVIEW")
            .await
            .unwrap();

        let history = repo.history_for(&defect.id);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].old_value, "NEW");
        assert_eq!(history[1].new_value, "IN_REVIEW");
    }
}
