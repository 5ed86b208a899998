//! Repository interfaces for data persistence
//!
//! These traits define the persistence contracts consumed by the domain
//! services. The domain layer defines only interfaces; implementations
//! live in the infrastructure crate and are assumed safe for concurrent
//! use by multiple in-flight operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    entities::{
        Attachment, AttachmentCreate, Comment, Defect, DefectListItem, DefectQuery, NewComment,
        NewDefect, NewProject, NewUser, Project, RefreshToken, User,
    },
    errors::DomainResult,
    value_objects::{AttachmentId, DefectId, DefectStatus, ProjectId, UserId},
};

/// Repository for the defect aggregate (defect rows, comments,
/// attachments and the audit history).
#[async_trait]
pub trait DefectRepository: Send + Sync {
    /// List defects matching the normalized query, ordered by creation
    /// time descending, at most `query.limit` rows.
    async fn list(&self, query: DefectQuery) -> DomainResult<Vec<DefectListItem>>;

    /// Persist a new defect in status [`DefectStatus::New`].
    async fn create(&self, defect: NewDefect) -> DomainResult<Defect>;

    /// Load the full aggregate: comments ascending by creation time,
    /// attachments descending by upload time. `EntityNotFound` on miss.
    async fn get(&self, id: &DefectId) -> DomainResult<Defect>;

    /// Conditionally set the status, guarded by the status the caller
    /// last observed. A guard mismatch is a `ConcurrencyConflict`; the
    /// actor is recorded as last modifier.
    async fn update_status(
        &self,
        id: &DefectId,
        status: DefectStatus,
        actor: &UserId,
        expected: DefectStatus,
    ) -> DomainResult<()>;

    /// Append one immutable audit record of a tracked-field change.
    async fn append_history(
        &self,
        defect_id: &DefectId,
        actor: &UserId,
        field: &str,
        old_value: &str,
        new_value: &str,
    ) -> DomainResult<()>;

    /// Persist a validated comment.
    async fn add_comment(&self, comment: NewComment) -> DomainResult<Comment>;

    /// Comments for a defect, ascending by creation time. Empty vec if
    /// none exist.
    async fn list_comments(&self, defect_id: &DefectId) -> DomainResult<Vec<Comment>>;

    /// Persist attachment metadata.
    async fn add_attachment(&self, attachment: AttachmentCreate) -> DomainResult<Attachment>;

    /// Attachments for a defect, descending by upload time.
    async fn list_attachments(&self, defect_id: &DefectId) -> DomainResult<Vec<Attachment>>;

    /// One attachment by (defect, attachment) pair. `EntityNotFound` if
    /// the pair does not match an existing row.
    async fn get_attachment(
        &self,
        defect_id: &DefectId,
        attachment_id: &AttachmentId,
    ) -> DomainResult<Attachment>;
}

/// Repository for project entities
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list(&self) -> DomainResult<Vec<Project>>;

    async fn create(&self, project: NewProject) -> DomainResult<Project>;

    /// `EntityNotFound` on miss.
    async fn get(&self, id: &ProjectId) -> DomainResult<Project>;
}

/// Repository for user entities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// `EntityNotFound` on miss. Lookup is by the already-lowercased
    /// email.
    async fn get_by_email(&self, email: &str) -> DomainResult<User>;

    async fn get_by_id(&self, id: &UserId) -> DomainResult<User>;

    /// `EmailAlreadyExists` on a duplicate email.
    async fn create(&self, user: NewUser) -> DomainResult<User>;

    async fn update_password(&self, id: &UserId, password_hash: &str) -> DomainResult<()>;
}

/// Repository for refresh tokens
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn save(
        &self,
        user_id: &UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// `EntityNotFound` if the token is unknown.
    async fn get(&self, token: &str) -> DomainResult<RefreshToken>;

    async fn delete(&self, token: &str) -> DomainResult<()>;

    async fn delete_by_user(&self, user_id: &UserId) -> DomainResult<()>;
}
