use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::services::user_service::UserError;

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware for protected routes.
///
/// Verifies the bearer token signature and expiry, then reloads the subject
/// from the store. Role and enabled state come from the current row, so
/// disabling an account locks out previously issued tokens on their next
/// request.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let claims = state
        .tokens()
        .verify(token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let identity = state
        .users()
        .resolve_identity(&claims.sub)
        .await
        .map_err(|err| match err {
            // A token naming a user that no longer exists is just a bad token
            UserError::NotFound(_) => ApiError::unauthorized("Unknown token subject"),
            other => ApiError::from(other),
        })?;

    tracing::Span::current().record("username", identity.username.as_str());

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_token_trims_whitespace() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_static("Bearer   abc.def.ghi  "),
        );
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_token_missing_or_wrong_scheme() {
        let headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
