//! The status write and the audit write are two independently failing
//! operations: a failed history append must never fail or undo the
//! transition, and a conditional-update conflict surfaces as-is with no
//! retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dtrack_domain::{
    entities::{
        Attachment, AttachmentCreate, Comment, Defect, DefectCreate, DefectListItem, DefectQuery,
        NewComment, NewDefect, NewProject, NewUser, User,
    },
    errors::{DomainError, DomainResult},
    repositories::{DefectRepository, ProjectRepository, UserRepository},
    services::DefectService,
    value_objects::{AttachmentId, DefectId, DefectStatus, Role, UserId},
};
use dtrack_persistence::memory::{
    InMemoryDefectRepository, InMemoryProjectRepository, InMemoryUserRepository,
};

/// Wraps the in-memory repository with switchable failure injection.
struct FlakyDefectRepository {
    inner: InMemoryDefectRepository,
    fail_history: AtomicBool,
    conflict_on_update: AtomicBool,
}

impl FlakyDefectRepository {
    fn new() -> Self {
        Self {
            inner: InMemoryDefectRepository::new(),
            fail_history: AtomicBool::new(false),
            conflict_on_update: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl DefectRepository for FlakyDefectRepository {
    async fn list(&self, query: DefectQuery) -> DomainResult<Vec<DefectListItem>> {
        self.inner.list(query).await
    }

    async fn create(&self, defect: NewDefect) -> DomainResult<Defect> {
        self.inner.create(defect).await
    }

    async fn get(&self, id: &DefectId) -> DomainResult<Defect> {
        self.inner.get(id).await
    }

    async fn update_status(
        &self,
        id: &DefectId,
        status: DefectStatus,
        actor: &UserId,
        expected: DefectStatus,
    ) -> DomainResult<()> {
        if self.conflict_on_update.load(Ordering::SeqCst) {
            return Err(DomainError::ConcurrencyConflict {
                resource: format!("defect {id} status"),
            });
        }
        self.inner.update_status(id, status, actor, expected).await
    }

    async fn append_history(
        &self,
        defect_id: &DefectId,
        actor: &UserId,
        field: &str,
        old_value: &str,
        new_value: &str,
    ) -> DomainResult<()> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(DomainError::repository("history table unavailable"));
        }
        self.inner
            .append_history(defect_id, actor, field, old_value, new_value)
            .await
    }

    async fn add_comment(&self, comment: NewComment) -> DomainResult<Comment> {
        self.inner.add_comment(comment).await
    }

    async fn list_comments(&self, defect_id: &DefectId) -> DomainResult<Vec<Comment>> {
        self.inner.list_comments(defect_id).await
    }

    async fn add_attachment(&self, attachment: AttachmentCreate) -> DomainResult<Attachment> {
        self.inner.add_attachment(attachment).await
    }

    async fn list_attachments(&self, defect_id: &DefectId) -> DomainResult<Vec<Attachment>> {
        self.inner.list_attachments(defect_id).await
    }

    async fn get_attachment(
        &self,
        defect_id: &DefectId,
        attachment_id: &AttachmentId,
    ) -> DomainResult<Attachment> {
        self.inner.get_attachment(defect_id, attachment_id).await
    }
}

async fn service_with(
    repo: Arc<FlakyDefectRepository>,
) -> (DefectService, User, dtrack_domain::Project) {
    let projects = Arc::new(InMemoryProjectRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());

    let manager = users
        .create(NewUser {
            email: "mgr@example.com".to_string(),
            full_name: "Mary Manager".to_string(),
            role: Role::Manager,
            password_hash: String::new(),
        })
        .await
        .unwrap();

    let project = projects
        .create(NewProject {
            name: "Billing".to_string(),
            stage: "Build".to_string(),
            description: String::new(),
            start_date: None,
            end_date: None,
            created_by: manager.id,
        })
        .await
        .unwrap();

    (DefectService::new(repo, projects, users), manager, project)
}

#[tokio::test]
async fn test_failed_audit_write_does_not_fail_the_transition() {
    let repo = Arc::new(FlakyDefectRepository::new());
    let (service, manager, project) = service_with(repo.clone()).await;

    let defect = service
        .create(
            &manager,
            DefectCreate {
                project_id: project.id,
                title: "audit gap".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    repo.fail_history.store(true, Ordering::SeqCst);

    let updated = service
        .update_status(&defect.id, &manager, "IN_PROGRESS")
        .await
        .unwrap();

    // Status moved even though the history append failed, leaving the
    // accepted at-most-one-of-two-writes gap.
    assert_eq!(updated.status, DefectStatus::InProgress);
    assert!(repo.inner.history_for(&defect.id).is_empty());
}

#[tokio::test]
async fn test_conditional_update_conflict_propagates_without_retry() {
    let repo = Arc::new(FlakyDefectRepository::new());
    let (service, manager, project) = service_with(repo.clone()).await;

    let defect = service
        .create(
            &manager,
            DefectCreate {
                project_id: project.id,
                title: "raced".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    repo.conflict_on_update.store(true, Ordering::SeqCst);

    let err = service
        .update_status(&defect.id, &manager, "IN_PROGRESS")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ConcurrencyConflict { .. }));

    // No write happened, and no audit entry either.
    assert_eq!(
        service.get(&defect.id).await.unwrap().status,
        DefectStatus::New
    );
    assert!(repo.inner.history_for(&defect.id).is_empty());
}
