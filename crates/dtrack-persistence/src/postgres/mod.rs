//! PostgreSQL repository implementations (feature `postgres`)
//!
//! SQL-backed counterparts of the in-memory repositories. Display names
//! are stored denormalized, same as the memory backend, so reads never
//! join. Schema lives in `migrations/` and is embedded at compile time.

mod defect_repository;
mod project_repository;
mod token_repository;
mod user_repository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use dtrack_domain::errors::{DomainError, DomainResult};
use dtrack_domain::value_objects::{DefectStatus, Priority, Role};

pub use defect_repository::PgDefectRepository;
pub use project_repository::PgProjectRepository;
pub use token_repository::PgTokenRepository;
pub use user_repository::PgUserRepository;

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Connect to PostgreSQL and run pending migrations.
pub async fn connect(database_url: &str) -> DomainResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(map_sqlx)?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|err| DomainError::repository(err.to_string()))?;

    Ok(pool)
}

pub(crate) fn map_sqlx(err: sqlx::Error) -> DomainError {
    DomainError::repository(err.to_string())
}

pub(crate) fn parse_status(raw: &str) -> DomainResult<DefectStatus> {
    DefectStatus::normalize(raw)
        .ok_or_else(|| DomainError::repository(format!("invalid status `{raw}` in storage")))
}

pub(crate) fn parse_priority(raw: Option<String>) -> DomainResult<Option<Priority>> {
    match raw {
        None => Ok(None),
        Some(value) => Priority::normalize(&value)
            .map(Some)
            .ok_or_else(|| DomainError::repository(format!("invalid priority `{value}` in storage"))),
    }
}

pub(crate) fn parse_role(raw: &str) -> DomainResult<Role> {
    Role::normalize(raw)
        .ok_or_else(|| DomainError::repository(format!("invalid role `{raw}` in storage")))
}
