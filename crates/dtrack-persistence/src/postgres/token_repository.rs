//! PostgreSQL refresh-token repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use dtrack_domain::{
    entities::RefreshToken,
    errors::{DomainError, DomainResult},
    repositories::TokenRepository,
    value_objects::UserId,
};

use super::map_sqlx;

/// SQL-backed implementation of [`TokenRepository`]
#[derive(Debug, Clone)]
pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn save(
        &self,
        user_id: &UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        sqlx::query("INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id.as_uuid())
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn get(&self, token: &str) -> DomainResult<RefreshToken> {
        let row = sqlx::query(
            "SELECT token, user_id, expires_at, created_at FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| DomainError::not_found("refresh token", token))?;

        Ok(RefreshToken {
            user_id: UserId::from(row.try_get::<Uuid, _>("user_id").map_err(map_sqlx)?),
            token: row.try_get("token").map_err(map_sqlx)?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(map_sqlx)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(map_sqlx)?,
        })
    }

    async fn delete(&self, token: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn delete_by_user(&self, user_id: &UserId) -> DomainResult<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}
