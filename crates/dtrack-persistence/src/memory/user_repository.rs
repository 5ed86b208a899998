//! In-memory user repository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use dtrack_domain::{
    entities::{NewUser, User},
    errors::{DomainError, DomainResult},
    repositories::UserRepository,
    value_objects::UserId,
};

/// Thread-safe in-memory implementation of [`UserRepository`]
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial users (useful for testing)
    pub fn with_users(users: Vec<User>) -> Self {
        let map = users.into_iter().map(|user| (user.id, user)).collect();
        Self {
            users: RwLock::new(map),
        }
    }

    /// Number of stored users (for testing)
    pub fn count(&self) -> usize {
        self.users.read().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_email(&self, email: &str) -> DomainResult<User> {
        self.users
            .read()
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or_else(|| DomainError::not_found("user", email))
    }

    async fn get_by_id(&self, id: &UserId) -> DomainResult<User> {
        self.users
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("user", id))
    }

    async fn create(&self, user: NewUser) -> DomainResult<User> {
        let mut users = self.users.write();
        if users.values().any(|existing| existing.email == user.email) {
            return Err(DomainError::EmailAlreadyExists { email: user.email });
        }

        let now = Utc::now();
        let stored = User {
            id: UserId::new(),
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_password(&self, id: &UserId, password_hash: &str) -> DomainResult<()> {
        let mut users = self.users.write();
        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("user", id))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtrack_domain::value_objects::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            full_name: "Test User".to_string(),
            role: Role::Engineer,
            password_hash: "$2b$dummy".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(new_user("dev@example.com")).await.unwrap();

        let by_email = repo.get_by_email("dev@example.com").await.unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = repo.get_by_id(&created.id).await.unwrap();
        assert_eq!(by_id.email, "dev@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("dup@example.com")).await.unwrap();

        let err = repo.create(new_user("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::EmailAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_with_initial_users() {
        let repo = InMemoryUserRepository::new();
        let seeded = repo.create(new_user("seed@example.com")).await.unwrap();

        let repo = InMemoryUserRepository::with_users(vec![seeded.clone()]);
        assert_eq!(repo.count(), 1);
        assert_eq!(
            repo.get_by_id(&seeded.id).await.unwrap().email,
            "seed@example.com"
        );
    }

    #[tokio::test]
    async fn test_update_password() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("pw@example.com")).await.unwrap();

        repo.update_password(&user.id, "$2b$new").await.unwrap();
        let reloaded = repo.get_by_id(&user.id).await.unwrap();
        assert_eq!(reloaded.password_hash, "$2b$new");
    }
}
