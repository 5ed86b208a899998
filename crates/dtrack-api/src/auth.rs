//! Credential plumbing: JWT access tokens, bcrypt password hashing and
//! opaque refresh tokens with rotation.
//!
//! This lives at the API boundary on purpose: the domain core only ever
//! sees an already-authenticated [`User`] and its role.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use dtrack_domain::{
    entities::{NewUser, User},
    errors::{DomainError, DomainResult},
    repositories::{TokenRepository, UserRepository},
    value_objects::{Role, UserId},
};

use crate::error::{ApiError, ApiResult};
use crate::models::RegisterRequest;

const MIN_PASSWORD_LEN: usize = 6;

/// JWT claims carried by access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenManager {
    pub fn new(secret: &str, access_ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(access_ttl_minutes),
        }
    }

    /// Sign an access token for the user
    pub fn generate(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            name: user.full_name.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }

    /// Access-token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Tokens handed out after a successful login/refresh
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub user: User,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub refresh_token: String,
}

/// Authentication service: login, registration, token refresh and
/// password changes
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    manager: TokenManager,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        manager: TokenManager,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            users,
            tokens,
            manager,
            refresh_ttl: Duration::days(refresh_ttl_days),
        }
    }

    /// Resolve a bearer token to its user. Any verification or lookup
    /// failure collapses into `InvalidCredentials`.
    pub async fn authenticate(&self, bearer: &str) -> DomainResult<User> {
        let claims = self
            .manager
            .verify(bearer)
            .map_err(|_| DomainError::InvalidCredentials)?;
        let id = UserId::parse(&claims.sub).map_err(|_| DomainError::InvalidCredentials)?;
        self.users
            .get_by_id(&id)
            .await
            .map_err(|_| DomainError::InvalidCredentials)
    }

    /// Verify email/password and issue a token pair. The error is the
    /// same regardless of which check failed.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<IssuedTokens> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.trim().is_empty() {
            return Err(DomainError::InvalidCredentials.into());
        }

        let user = self
            .users
            .get_by_email(&email)
            .await
            .map_err(|_| DomainError::InvalidCredentials)?;

        let matches = bcrypt::verify(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !matches {
            return Err(DomainError::InvalidCredentials.into());
        }

        self.issue(user).await
    }

    /// Register a new user
    pub async fn register(&self, payload: RegisterRequest) -> ApiResult<User> {
        let email = payload.email.trim().to_lowercase();
        let full_name = payload.full_name.trim().to_string();
        let password = payload.password.trim();

        if email.is_empty() || full_name.is_empty() || password.is_empty() {
            return Err(DomainError::validation(
                "registration",
                "email, full name and password are required",
            )
            .into());
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(
                "password",
                format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            )
            .into());
        }

        let role = match payload.role.as_deref().filter(|role| !role.trim().is_empty()) {
            None => Role::Engineer,
            Some(raw) => Role::normalize(raw)
                .ok_or_else(|| DomainError::validation("role", format!("unknown role `{raw}`")))?,
        };

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|err| ApiError::Internal(err.to_string()))?;

        Ok(self
            .users
            .create(NewUser {
                email,
                full_name,
                role,
                password_hash,
            })
            .await?)
    }

    /// Rotate a refresh token: the presented token is consumed and a
    /// fresh pair is issued.
    pub async fn refresh(&self, token: &str) -> ApiResult<IssuedTokens> {
        let existing = self
            .tokens
            .get(token)
            .await
            .map_err(|_| DomainError::InvalidCredentials)?;

        if Utc::now() > existing.expires_at {
            return Err(DomainError::TokenExpired.into());
        }

        self.tokens.delete(token).await?;
        let user = self.users.get_by_id(&existing.user_id).await?;
        self.issue(user).await
    }

    /// Revoke one refresh token, or all of the user's tokens when none
    /// is given.
    pub async fn logout(&self, user: &User, refresh_token: Option<&str>) -> ApiResult<()> {
        match refresh_token {
            Some(token) => self.tokens.delete(token).await?,
            None => self.tokens.delete_by_user(&user.id).await?,
        }
        Ok(())
    }

    /// Change the password after re-verifying the current one
    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        let new_password = new_password.trim();
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(
                "newPassword",
                format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            )
            .into());
        }

        let matches = bcrypt::verify(current_password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !matches {
            return Err(DomainError::InvalidCredentials.into());
        }

        let hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)
            .map_err(|err| ApiError::Internal(err.to_string()))?;
        Ok(self.users.update_password(&user.id, &hash).await?)
    }

    async fn issue(&self, user: User) -> ApiResult<IssuedTokens> {
        let access_token = self
            .manager
            .generate(&user)
            .map_err(|err| ApiError::Internal(err.to_string()))?;
        let expires_at = Utc::now() + self.manager.ttl();

        let refresh_token = generate_refresh_token();
        self.tokens
            .save(&user.id, &refresh_token, Utc::now() + self.refresh_ttl)
            .await?;

        Ok(IssuedTokens {
            user,
            access_token,
            expires_at,
            refresh_token,
        })
    }
}

/// 32 random bytes, hex-encoded
fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            email: "dev@example.com".to_string(),
            full_name: "Dev Example".to_string(),
            role,
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let manager = TokenManager::new("test-secret", 60);
        let user = user(Role::Manager);

        let token = manager.generate(&user).unwrap();
        let claims = manager.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.name, "Dev Example");
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let manager = TokenManager::new("secret-a", 60);
        let other = TokenManager::new("secret-b", 60);

        let token = manager.generate(&user(Role::Engineer)).unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_refresh_tokens_are_unique_hex() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
