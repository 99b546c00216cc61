//! User and authentication endpoints.

use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::{
    ApiError, AppState, AuthenticationRequest, ChangePasswordRequest, RegisterRequest,
    StatusResponse, TokenResponse, UserStatusRequest,
};
use crate::models::{Identity, User};
use crate::services::user_service::{NewUser, UserError};

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let msg = err.to_string();
        match err {
            UserError::InvalidCredentials(_) => Self::Unauthorized(msg),
            UserError::NotFound(_) => Self::NotFound(msg),
            UserError::UsernameTaken(_) => Self::Conflict(msg),
            UserError::Disabled(_) | UserError::Forbidden(_) => Self::Forbidden(msg),
            UserError::Validation(_) => Self::ValidationError(msg),
            UserError::Unavailable(_) => Self::Infrastructure(msg),
            UserError::TokenSigning(_) | UserError::Database(_) | UserError::Internal(_) => {
                Self::InternalError(msg)
            }
        }
    }
}

/// POST /user/register
/// Create a new user. ADMIN only; the role defaults to USER.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .users()
        .register(
            &identity,
            NewUser {
                username: payload.username,
                password: payload.password,
                role: payload.role,
            },
        )
        .await?;

    Ok(Json(user))
}

/// POST /user/authenticate
/// Verify credentials and return a bearer token. No token required.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AuthenticationRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let token = state
        .users()
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// PUT /user/change/password
/// Change a password after verifying the old one. Naming another user in the
/// body requires ADMIN; otherwise the token subject is the target.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    state
        .users()
        .change_password(
            &identity,
            payload.username.as_deref(),
            &payload.old_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(StatusResponse::success("password was changed")))
}

/// PUT /user/status
/// Enable or disable an account. ADMIN only.
pub async fn set_user_status(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UserStatusRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    state
        .users()
        .set_user_status(&identity, &payload.username, payload.enabled)
        .await?;

    Ok(Json(StatusResponse::success("user status was changed")))
}

/// GET /users
/// List all users, without password hashes. ADMIN only.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users().list_users(&identity).await?;

    Ok(Json(users))
}
