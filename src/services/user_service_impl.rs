//! `SeaORM` implementation of the `UserService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::repositories::user::{hash_password, verify_password};
use crate::db::{self, Store};
use crate::models::{Identity, Role, User};
use crate::services::policy::{Operation, authorize};
use crate::services::token::TokenService;
use crate::services::user_service::{
    NewUser, UserError, UserService, validate_password, validate_username,
};

pub struct SeaOrmUserService {
    store: Store,
    tokens: Arc<TokenService>,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenService>, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    /// Hash a password with the configured Argon2 cost parameters, off the
    /// async runtime.
    async fn hash_with_config(&self, password: String) -> Result<String, UserError> {
        let config = self.security.clone();
        task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .map_err(|e| UserError::Internal(format!("Password hashing task panicked: {e}")))?
            .map_err(|e| UserError::Internal(e.to_string()))
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn register(&self, actor: &Identity, new_user: NewUser) -> Result<User, UserError> {
        authorize(actor, Operation::RegisterUser)?;

        validate_username(&new_user.username)?;
        validate_password(&new_user.password)?;

        let role = new_user.role.unwrap_or(Role::User);
        let hash = self.hash_with_config(new_user.password).await?;

        let user = self
            .store
            .insert_user(&new_user.username, &hash, role)
            .await
            .map_err(|err| {
                if db::is_unique_violation(&err) {
                    UserError::UsernameTaken(new_user.username.clone())
                } else {
                    UserError::from(err)
                }
            })?;

        tracing::info!("Registered user {} with role {}", user.username, user.role);

        Ok(user)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<String, UserError> {
        let Some((user, stored_hash)) = self.store.get_user_with_hash(username).await? else {
            return Err(UserError::InvalidCredentials(username.to_string()));
        };

        // Disabled accounts are refused before the password is checked, so a
        // correct password changes nothing about the outcome
        if !user.enabled {
            return Err(UserError::Disabled(username.to_string()));
        }

        let valid = verify_password(stored_hash, password.to_string()).await?;
        if !valid {
            return Err(UserError::InvalidCredentials(username.to_string()));
        }

        let token = self
            .tokens
            .issue(&user.username, user.role)
            .map_err(|e| UserError::TokenSigning(e.to_string()))?;

        tracing::info!("User {} authenticated", user.username);

        Ok(token)
    }

    async fn change_password(
        &self,
        actor: &Identity,
        target: Option<&str>,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), UserError> {
        let username = match target {
            Some(name) if name != actor.username => {
                authorize(actor, Operation::ChangeOtherPassword)?;
                name
            }
            _ => {
                authorize(actor, Operation::ChangeOwnPassword)?;
                actor.username.as_str()
            }
        };

        validate_password(new_password)?;

        let Some((_, stored_hash)) = self.store.get_user_with_hash(username).await? else {
            return Err(UserError::InvalidCredentials(username.to_string()));
        };

        let valid = verify_password(stored_hash, old_password.to_string()).await?;
        if !valid {
            return Err(UserError::InvalidCredentials(username.to_string()));
        }

        let new_hash = self.hash_with_config(new_password.to_string()).await?;

        let updated = self
            .store
            .update_user_password_hash(username, &new_hash)
            .await?;
        if !updated {
            // Row vanished between the credential check and the write
            return Err(UserError::NotFound(username.to_string()));
        }

        tracing::info!("Password changed for user {username}");

        Ok(())
    }

    async fn set_user_status(
        &self,
        actor: &Identity,
        username: &str,
        enabled: bool,
    ) -> Result<(), UserError> {
        authorize(actor, Operation::SetUserStatus)?;

        let updated = self.store.set_user_enabled(username, enabled).await?;
        if !updated {
            return Err(UserError::NotFound(username.to_string()));
        }

        tracing::info!(
            "User {username} {}",
            if enabled { "enabled" } else { "disabled" }
        );

        Ok(())
    }

    async fn list_users(&self, actor: &Identity) -> Result<Vec<User>, UserError> {
        authorize(actor, Operation::ListUsers)?;

        Ok(self.store.list_users().await?)
    }

    async fn resolve_identity(&self, username: &str) -> Result<Identity, UserError> {
        let Some(user) = self.store.get_user_by_username(username).await? else {
            return Err(UserError::NotFound(username.to_string()));
        };

        if !user.enabled {
            return Err(UserError::Disabled(username.to_string()));
        }

        Ok(Identity {
            username: user.username,
            role: user.role,
        })
    }
}
