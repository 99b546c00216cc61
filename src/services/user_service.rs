//! Domain service for authentication and user management.
//!
//! Handles registration, credential verification and token issuance, password
//! changes, and account enable/disable.

use thiserror::Error;

use crate::models::{Identity, Role, User};
use crate::services::policy::AccessDenied;

pub const USERNAME_MIN_CHARS: usize = 5;
pub const USERNAME_MAX_CHARS: usize = 20;
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Errors specific to user and authentication operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Unknown username or wrong password. One variant for both so the
    /// response does not reveal which usernames exist.
    #[error("Invalid credentials for user: {0}")]
    InvalidCredentials(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Username is already taken: {0}")]
    UsernameTaken(String),

    #[error("User is disabled: {0}")]
    Disabled(String),

    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Failed to sign token: {0}")]
    TokenSigning(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unavailable(&err) {
            Self::Unavailable(err.to_string())
        } else {
            Self::Database(err.to_string())
        }
    }
}

/// Registration input. A missing role defaults to USER.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Option<Role>,
}

/// Domain service trait for users and authentication.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Registers a new user. ADMIN only.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::UsernameTaken`] on a duplicate username and
    /// [`UserError::Validation`] when username or password constraints fail.
    async fn register(&self, actor: &Identity, new_user: NewUser) -> Result<User, UserError>;

    /// Verifies credentials and returns a signed bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::InvalidCredentials`] for an unknown username or
    /// wrong password, [`UserError::Disabled`] for a disabled account even
    /// when the password is correct.
    async fn authenticate(&self, username: &str, password: &str) -> Result<String, UserError>;

    /// Changes a password after verifying the old one. A `target` of `None`
    /// means the caller's own account; naming another user requires ADMIN.
    async fn change_password(
        &self,
        actor: &Identity,
        target: Option<&str>,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), UserError>;

    /// Enables or disables an account. ADMIN only.
    async fn set_user_status(
        &self,
        actor: &Identity,
        username: &str,
        enabled: bool,
    ) -> Result<(), UserError>;

    /// Lists all users, without password hashes. ADMIN only.
    async fn list_users(&self, actor: &Identity) -> Result<Vec<User>, UserError>;

    /// Resolves a token subject into a fresh identity from the store, so role
    /// and enabled-state changes apply to requests made with older tokens.
    async fn resolve_identity(&self, username: &str) -> Result<Identity, UserError>;
}

/// Validate a username against the registration constraints
pub fn validate_username(username: &str) -> Result<(), UserError> {
    if username.trim().is_empty() {
        return Err(UserError::Validation(
            "Username must not be empty".to_string(),
        ));
    }

    let chars = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&chars) {
        return Err(UserError::Validation(format!(
            "Username must be between {USERNAME_MIN_CHARS} and {USERNAME_MAX_CHARS} characters"
        )));
    }

    Ok(())
}

/// Validate a password against the minimum-length constraint
pub fn validate_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(UserError::Validation(format!(
            "Password must be at least {PASSWORD_MIN_CHARS} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("abcde").is_ok());
        assert!(validate_username("a".repeat(20).as_str()).is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("     ").is_err());
        assert!(validate_username("abcd").is_err());
        assert!(validate_username("a".repeat(21).as_str()).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password1").is_ok());
        assert!(validate_password("12345678").is_ok());

        assert!(validate_password("1234567").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validation_messages_name_the_constraint() {
        let err = validate_username("abc").unwrap_err();
        assert!(err.to_string().contains("between 5 and 20"));

        let err = validate_password("short").unwrap_err();
        assert!(err.to_string().contains("at least 8"));
    }
}
