//! PostgreSQL project repository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use dtrack_domain::{
    entities::{NewProject, Project},
    errors::{DomainError, DomainResult},
    repositories::ProjectRepository,
    value_objects::{ProjectId, UserId},
};

use super::map_sqlx;

/// SQL-backed implementation of [`ProjectRepository`]
#[derive(Debug, Clone)]
pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn project_from_row(row: &sqlx::postgres::PgRow) -> DomainResult<Project> {
        Ok(Project {
            id: ProjectId::from(row.try_get::<Uuid, _>("id").map_err(map_sqlx)?),
            name: row.try_get("name").map_err(map_sqlx)?,
            stage: row.try_get("stage").map_err(map_sqlx)?,
            description: row.try_get("description").map_err(map_sqlx)?,
            start_date: row
                .try_get::<Option<NaiveDate>, _>("start_date")
                .map_err(map_sqlx)?,
            end_date: row
                .try_get::<Option<NaiveDate>, _>("end_date")
                .map_err(map_sqlx)?,
            created_by: UserId::from(row.try_get::<Uuid, _>("created_by").map_err(map_sqlx)?),
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(map_sqlx)?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(map_sqlx)?,
        })
    }
}

const PROJECT_COLUMNS: &str =
    "id, name, stage, description, start_date, end_date, created_by, created_at, updated_at";

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn list(&self) -> DomainResult<Vec<Project>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(Self::project_from_row).collect()
    }

    async fn create(&self, project: NewProject) -> DomainResult<Project> {
        let row = sqlx::query(&format!(
            "INSERT INTO projects (name, stage, description, start_date, end_date, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(&project.name)
        .bind(&project.stage)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.created_by.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Self::project_from_row(&row)
    }

    async fn get(&self, id: &ProjectId) -> DomainResult<Project> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| DomainError::not_found("project", id))?;

        Self::project_from_row(&row)
    }
}
