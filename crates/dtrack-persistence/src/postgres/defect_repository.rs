//! PostgreSQL defect repository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use dtrack_domain::{
    entities::{
        Attachment, AttachmentCreate, Comment, Defect, DefectListItem, DefectQuery, NewComment,
        NewDefect,
    },
    errors::{DomainError, DomainResult},
    repositories::DefectRepository,
    value_objects::{AttachmentId, CommentId, DefectId, DefectStatus, UserId},
};

use super::{map_sqlx, parse_priority, parse_status};

/// SQL-backed implementation of [`DefectRepository`]
#[derive(Debug, Clone)]
pub struct PgDefectRepository {
    pool: PgPool,
}

impl PgDefectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn comment_from_row(row: &sqlx::postgres::PgRow) -> DomainResult<Comment> {
        Ok(Comment {
            id: CommentId::from(row.try_get::<Uuid, _>("id").map_err(map_sqlx)?),
            defect_id: DefectId::from(row.try_get::<Uuid, _>("defect_id").map_err(map_sqlx)?),
            author_id: UserId::from(row.try_get::<Uuid, _>("author_id").map_err(map_sqlx)?),
            author_name: row.try_get("author_name").map_err(map_sqlx)?,
            body: row.try_get("body").map_err(map_sqlx)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(map_sqlx)?,
        })
    }

    fn attachment_from_row(row: &sqlx::postgres::PgRow) -> DomainResult<Attachment> {
        Ok(Attachment {
            id: AttachmentId::from(row.try_get::<Uuid, _>("id").map_err(map_sqlx)?),
            defect_id: DefectId::from(row.try_get::<Uuid, _>("defect_id").map_err(map_sqlx)?),
            filename: row.try_get("filename").map_err(map_sqlx)?,
            content_type: row.try_get("content_type").map_err(map_sqlx)?,
            size_bytes: row.try_get("size_bytes").map_err(map_sqlx)?,
            storage_key: row.try_get("storage_key").map_err(map_sqlx)?,
            uploaded_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(map_sqlx)?,
        })
    }

    fn defect_from_row(row: &sqlx::postgres::PgRow) -> DomainResult<Defect> {
        Ok(Defect {
            id: DefectId::from(row.try_get::<Uuid, _>("id").map_err(map_sqlx)?),
            project_id: row
                .try_get::<Uuid, _>("project_id")
                .map_err(map_sqlx)?
                .into(),
            project_name: row.try_get("project_name").map_err(map_sqlx)?,
            title: row.try_get("title").map_err(map_sqlx)?,
            description: row.try_get("description").map_err(map_sqlx)?,
            priority: parse_priority(row.try_get("priority").map_err(map_sqlx)?)?,
            severity: parse_priority(row.try_get("severity").map_err(map_sqlx)?)?,
            status: parse_status(&row.try_get::<String, _>("status").map_err(map_sqlx)?)?,
            assignee_id: row
                .try_get::<Option<Uuid>, _>("assignee_id")
                .map_err(map_sqlx)?
                .map(UserId::from),
            assignee_name: row.try_get("assignee_name").map_err(map_sqlx)?,
            due_date: row
                .try_get::<Option<NaiveDate>, _>("due_date")
                .map_err(map_sqlx)?,
            created_by: UserId::from(row.try_get::<Uuid, _>("created_by").map_err(map_sqlx)?),
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(map_sqlx)?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(map_sqlx)?,
            comments: Vec::new(),
            attachments: Vec::new(),
        })
    }
}

#[async_trait]
impl DefectRepository for PgDefectRepository {
    async fn list(&self, query: DefectQuery) -> DomainResult<Vec<DefectListItem>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, project_id, project_name, title, priority, status, \
             assignee_id, assignee_name, due_date, updated_at \
             FROM defects WHERE 1=1",
        );

        if let Some(project) = query.project {
            builder.push(" AND project_id = ");
            builder.push_bind(project.as_uuid());
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ");
            builder.push_bind(status.as_str());
        }
        if let Some(priority) = query.priority {
            builder.push(" AND priority = ");
            builder.push_bind(priority.as_str());
        }

        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(query.limit);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        rows.iter()
            .map(|row| {
                Ok(DefectListItem {
                    id: DefectId::from(row.try_get::<Uuid, _>("id").map_err(map_sqlx)?),
                    project_id: row
                        .try_get::<Uuid, _>("project_id")
                        .map_err(map_sqlx)?
                        .into(),
                    project_name: row.try_get("project_name").map_err(map_sqlx)?,
                    title: row.try_get("title").map_err(map_sqlx)?,
                    priority: parse_priority(row.try_get("priority").map_err(map_sqlx)?)?,
                    status: parse_status(&row.try_get::<String, _>("status").map_err(map_sqlx)?)?,
                    assignee_id: row
                        .try_get::<Option<Uuid>, _>("assignee_id")
                        .map_err(map_sqlx)?
                        .map(UserId::from),
                    assignee_name: row.try_get("assignee_name").map_err(map_sqlx)?,
                    due_date: row
                        .try_get::<Option<NaiveDate>, _>("due_date")
                        .map_err(map_sqlx)?,
                    updated_at: row
                        .try_get::<DateTime<Utc>, _>("updated_at")
                        .map_err(map_sqlx)?,
                })
            })
            .collect()
    }

    async fn create(&self, defect: NewDefect) -> DomainResult<Defect> {
        let row = sqlx::query(
            "INSERT INTO defects \
             (project_id, project_name, title, description, priority, severity, \
              status, assignee_id, assignee_name, due_date, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, 'NEW', $7, $8, $9, $10, $10) \
             RETURNING id, project_id, project_name, title, description, priority, \
                       severity, status, assignee_id, assignee_name, due_date, \
                       created_by, created_at, updated_at",
        )
        .bind(defect.project_id.as_uuid())
        .bind(&defect.project_name)
        .bind(&defect.title)
        .bind(&defect.description)
        .bind(defect.priority.map(|p| p.as_str()))
        .bind(defect.severity.map(|p| p.as_str()))
        .bind(defect.assignee_id.map(|id| id.as_uuid()))
        .bind(&defect.assignee_name)
        .bind(defect.due_date)
        .bind(defect.created_by.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Self::defect_from_row(&row)
    }

    async fn get(&self, id: &DefectId) -> DomainResult<Defect> {
        let row = sqlx::query(
            "SELECT id, project_id, project_name, title, description, priority, \
             severity, status, assignee_id, assignee_name, due_date, created_by, \
             created_at, updated_at FROM defects WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| DomainError::not_found("defect", id))?;

        let mut defect = Self::defect_from_row(&row)?;
        defect.comments = self.list_comments(id).await?;
        defect.attachments = self.list_attachments(id).await?;
        Ok(defect)
    }

    async fn update_status(
        &self,
        id: &DefectId,
        status: DefectStatus,
        actor: &UserId,
        expected: DefectStatus,
    ) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE defects SET status = $1, updated_by = $2, updated_at = NOW() \
             WHERE id = $3 AND status = $4",
        )
        .bind(status.as_str())
        .bind(actor.as_uuid())
        .bind(id.as_uuid())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Guard mismatch or missing row; probe to tell the two apart.
        let exists = sqlx::query("SELECT 1 FROM defects WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        match exists {
            Some(_) => Err(DomainError::ConcurrencyConflict {
                resource: format!("defect {id} status"),
            }),
            None => Err(DomainError::not_found("defect", id)),
        }
    }

    async fn append_history(
        &self,
        defect_id: &DefectId,
        actor: &UserId,
        field: &str,
        old_value: &str,
        new_value: &str,
    ) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO defect_history (defect_id, actor_id, field, old_value, new_value) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(defect_id.as_uuid())
        .bind(actor.as_uuid())
        .bind(field)
        .bind(old_value)
        .bind(new_value)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn add_comment(&self, comment: NewComment) -> DomainResult<Comment> {
        let row = sqlx::query(
            "INSERT INTO defect_comments (defect_id, author_id, author_name, body) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, defect_id, author_id, author_name, body, created_at",
        )
        .bind(comment.defect_id.as_uuid())
        .bind(comment.author_id.as_uuid())
        .bind(&comment.author_name)
        .bind(&comment.body)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Self::comment_from_row(&row)
    }

    async fn list_comments(&self, defect_id: &DefectId) -> DomainResult<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, defect_id, author_id, author_name, body, created_at \
             FROM defect_comments WHERE defect_id = $1 ORDER BY created_at ASC",
        )
        .bind(defect_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(Self::comment_from_row).collect()
    }

    async fn add_attachment(&self, attachment: AttachmentCreate) -> DomainResult<Attachment> {
        let row = sqlx::query(
            "INSERT INTO defect_attachments \
             (defect_id, filename, content_type, size_bytes, storage_key) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, defect_id, filename, content_type, size_bytes, storage_key, created_at",
        )
        .bind(attachment.defect_id.as_uuid())
        .bind(&attachment.filename)
        .bind(&attachment.content_type)
        .bind(attachment.size_bytes)
        .bind(&attachment.storage_key)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Self::attachment_from_row(&row)
    }

    async fn list_attachments(&self, defect_id: &DefectId) -> DomainResult<Vec<Attachment>> {
        let rows = sqlx::query(
            "SELECT id, defect_id, filename, content_type, size_bytes, storage_key, created_at \
             FROM defect_attachments WHERE defect_id = $1 ORDER BY created_at DESC",
        )
        .bind(defect_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(Self::attachment_from_row).collect()
    }

    async fn get_attachment(
        &self,
        defect_id: &DefectId,
        attachment_id: &AttachmentId,
    ) -> DomainResult<Attachment> {
        let row = sqlx::query(
            "SELECT id, defect_id, filename, content_type, size_bytes, storage_key, created_at \
             FROM defect_attachments WHERE defect_id = $1 AND id = $2",
        )
        .bind(defect_id.as_uuid())
        .bind(attachment_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| DomainError::not_found("attachment", attachment_id))?;

        Self::attachment_from_row(&row)
    }
}
