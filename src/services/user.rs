//! User service
//!
//! Implements business logic for user management:
//! - Signup (username uniqueness, non-empty credentials)
//! - Login/logout with session tokens
//! - Session validation with expiry checking

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{Session, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Registration input
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
}

impl RegisterInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Login input
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Create a new user service with custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if username or password is empty
    /// - `UserExists` if the username is already taken
    /// - `InternalError` for database errors
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        if self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(username.to_string(), password_hash);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!("Registered user '{}' (id {})", created.username, created.id);
        Ok(created)
    }

    /// Log a user in, returning a fresh session.
    ///
    /// # Errors
    ///
    /// `AuthenticationError` when the username is unknown or the password
    /// does not match. The two cases are deliberately indistinguishable.
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(input.username.trim())
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError("Invalid username or password".to_string())
            })?;

        let valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };

        let session = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        tracing::debug!("User '{}' logged in", user.username);
        Ok(session)
    }

    /// Log out by deleting the session for the given token.
    ///
    /// Unknown tokens are not an error; logout is idempotent.
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Validate a session token, returning the logged-in user.
    ///
    /// Returns `None` for unknown or expired tokens. Expired sessions are
    /// removed on sight.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to look up session")?
        {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.session_repo
                .delete(&session.id)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to look up session user")?;

        Ok(user)
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn sweep_expired_sessions(&self) -> Result<i64, UserServiceError> {
        let deleted = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup_test_service() -> (DynDatabasePool, UserService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        let service = UserService::new(user_repo, session_repo);

        (pool, service)
    }

    // ========================================================================
    // Registration tests
    // ========================================================================

    #[tokio::test]
    async fn test_register_user() {
        let (_pool, service) = setup_test_service().await;

        let user = service
            .register(RegisterInput::new("author", "password123"))
            .await
            .expect("Failed to register");

        assert!(user.id > 0);
        assert_eq!(user.username, "author");
        assert_ne!(user.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_register_duplicate_username_fails() {
        let (_pool, service) = setup_test_service().await;
        service
            .register(RegisterInput::new("taken", "password123"))
            .await
            .expect("Failed to register first user");

        let result = service.register(RegisterInput::new("taken", "other")).await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_register_empty_username_fails() {
        let (_pool, service) = setup_test_service().await;

        let result = service.register(RegisterInput::new("  ", "password123")).await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_register_empty_password_fails() {
        let (_pool, service) = setup_test_service().await;

        let result = service.register(RegisterInput::new("user", "")).await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    // ========================================================================
    // Login / session tests
    // ========================================================================

    #[tokio::test]
    async fn test_login_success() {
        let (_pool, service) = setup_test_service().await;
        service
            .register(RegisterInput::new("author", "password123"))
            .await
            .expect("Failed to register");

        let session = service
            .login(LoginInput::new("author", "password123"))
            .await
            .expect("Failed to login");

        assert!(!session.id.is_empty());
        assert!(!session.is_expired());
    }

    #[tokio::test]
    async fn test_login_wrong_password_fails() {
        let (_pool, service) = setup_test_service().await;
        service
            .register(RegisterInput::new("author", "password123"))
            .await
            .expect("Failed to register");

        let result = service.login(LoginInput::new("author", "wrong")).await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_user_fails() {
        let (_pool, service) = setup_test_service().await;

        let result = service.login(LoginInput::new("ghost", "password")).await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_validate_session_returns_user() {
        let (_pool, service) = setup_test_service().await;
        let user = service
            .register(RegisterInput::new("author", "password123"))
            .await
            .expect("Failed to register");
        let session = service
            .login(LoginInput::new("author", "password123"))
            .await
            .expect("Failed to login");

        let validated = service
            .validate_session(&session.id)
            .await
            .expect("Validation errored")
            .expect("Session should be valid");
        assert_eq!(validated.id, user.id);
    }

    #[tokio::test]
    async fn test_validate_unknown_token_returns_none() {
        let (_pool, service) = setup_test_service().await;

        let validated = service
            .validate_session("no-such-token")
            .await
            .expect("Validation errored");
        assert!(validated.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_removed() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let service = UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            -1, // sessions are born expired
        );

        service
            .register(RegisterInput::new("author", "password123"))
            .await
            .expect("Failed to register");
        let session = service
            .login(LoginInput::new("author", "password123"))
            .await
            .expect("Failed to login");

        let validated = service
            .validate_session(&session.id)
            .await
            .expect("Validation errored");
        assert!(validated.is_none());
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let (_pool, service) = setup_test_service().await;
        service
            .register(RegisterInput::new("author", "password123"))
            .await
            .expect("Failed to register");
        let session = service
            .login(LoginInput::new("author", "password123"))
            .await
            .expect("Failed to login");

        service.logout(&session.id).await.expect("Failed to logout");

        let validated = service
            .validate_session(&session.id)
            .await
            .expect("Validation errored");
        assert!(validated.is_none());
    }
}
