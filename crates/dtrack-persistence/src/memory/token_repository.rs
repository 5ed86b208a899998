//! In-memory refresh-token repository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use dtrack_domain::{
    entities::RefreshToken,
    errors::{DomainError, DomainResult},
    repositories::TokenRepository,
    value_objects::UserId,
};

/// Thread-safe in-memory implementation of [`TokenRepository`]
#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl InMemoryTokenRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens (for testing)
    pub fn count(&self) -> usize {
        self.tokens.read().len()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save(
        &self,
        user_id: &UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.tokens.write().insert(
            token.to_string(),
            RefreshToken {
                user_id: *user_id,
                token: token.to_string(),
                expires_at,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, token: &str) -> DomainResult<RefreshToken> {
        self.tokens
            .read()
            .get(token)
            .cloned()
            .ok_or_else(|| DomainError::not_found("refresh token", token))
    }

    async fn delete(&self, token: &str) -> DomainResult<()> {
        self.tokens.write().remove(token);
        Ok(())
    }

    async fn delete_by_user(&self, user_id: &UserId) -> DomainResult<()> {
        self.tokens
            .write()
            .retain(|_, stored| stored.user_id != *user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_save_get_delete() {
        let repo = InMemoryTokenRepository::new();
        let user = UserId::new();
        let expires = Utc::now() + Duration::days(30);

        repo.save(&user, "tok-1", expires).await.unwrap();
        let stored = repo.get("tok-1").await.unwrap();
        assert_eq!(stored.user_id, user);

        repo.delete("tok-1").await.unwrap();
        assert!(repo.get("tok-1").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_by_user_removes_all() {
        let repo = InMemoryTokenRepository::new();
        let user = UserId::new();
        let other = UserId::new();
        let expires = Utc::now() + Duration::days(30);

        repo.save(&user, "a", expires).await.unwrap();
        repo.save(&user, "b", expires).await.unwrap();
        repo.save(&other, "c", expires).await.unwrap();

        repo.delete_by_user(&user).await.unwrap();
        assert_eq!(repo.count(), 1);
        assert!(repo.get("c").await.is_ok());
    }
}
