//! PostgreSQL user repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use dtrack_domain::{
    entities::{NewUser, User},
    errors::{DomainError, DomainResult},
    repositories::UserRepository,
    value_objects::UserId,
};

use super::{map_sqlx, parse_role};

/// SQL-backed implementation of [`UserRepository`]
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn user_from_row(row: &sqlx::postgres::PgRow) -> DomainResult<User> {
        Ok(User {
            id: UserId::from(row.try_get::<Uuid, _>("id").map_err(map_sqlx)?),
            email: row.try_get("email").map_err(map_sqlx)?,
            full_name: row.try_get("full_name").map_err(map_sqlx)?,
            role: parse_role(&row.try_get::<String, _>("role").map_err(map_sqlx)?)?,
            password_hash: row.try_get("password_hash").map_err(map_sqlx)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(map_sqlx)?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(map_sqlx)?,
        })
    }
}

const USER_COLUMNS: &str = "id, email, full_name, role, password_hash, created_at, updated_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_email(&self, email: &str) -> DomainResult<User> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| DomainError::not_found("user", email))?;

        Self::user_from_row(&row)
    }

    async fn get_by_id(&self, id: &UserId) -> DomainResult<User> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| DomainError::not_found("user", id))?;

        Self::user_from_row(&row)
    }

    async fn create(&self, user: NewUser) -> DomainResult<User> {
        let email = user.email.clone();
        let row = sqlx::query(&format!(
            "INSERT INTO users (email, full_name, role, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if err
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                DomainError::EmailAlreadyExists { email }
            } else {
                map_sqlx(err)
            }
        })?;

        Self::user_from_row(&row)
    }

    async fn update_password(&self, id: &UserId, password_hash: &str) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user", id));
        }
        Ok(())
    }
}
