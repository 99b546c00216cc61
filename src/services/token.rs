//! Stateless bearer-token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the username and role. Verification is pure
//! signature + expiry checking; there is no revocation list, so account-level
//! changes are enforced by re-reading the user row per request instead.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;
use crate::models::Role;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity_hours: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &str, validity_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validity_hours,
        }
    }

    /// Build the service from configuration. An empty configured secret is
    /// replaced with a random process-lifetime one, which keeps the server
    /// usable but invalidates all tokens on restart.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        if config.token_secret.is_empty() {
            tracing::warn!(
                "auth.token_secret is empty, using an ephemeral secret; tokens will not survive a restart"
            );
            Self::new(&generate_secret(), config.token_validity_hours)
        } else {
            Self::new(&config.token_secret, config.token_validity_hours)
        }
    }

    /// Issue a signed token for the given user and role
    pub fn issue(&self, username: &str, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(chrono::Duration::hours(self.validity_hours))
            .ok_or_else(|| TokenError::Signing("token validity overflows".to_string()))?;

        let claims = Claims {
            sub: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims.
    /// Expired tokens are reported separately from malformed or forged ones.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

/// Generate a random signing secret (64 character hex string)
#[must_use]
pub fn generate_secret() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = TokenService::new("test-secret-key-12345", 24);

        let token = service.issue("alice_01", Role::User).unwrap();
        assert!(!token.is_empty());

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice_01");
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_admin_role_round_trips() {
        let service = TokenService::new("test-secret-key-12345", 24);

        let token = service.issue("admin", Role::Admin).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = TokenService::new("test-secret-key-12345", 24);

        let result = service.verify("not.a.token");
        assert!(matches!(result, Err(TokenError::Invalid)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new("secret-one", 24);
        let verifier = TokenService::new("secret-two", 24);

        let token = issuer.issue("alice_01", Role::User).unwrap();

        let result = verifier.verify(&token);
        assert!(matches!(result, Err(TokenError::Invalid)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = TokenService::new("test-secret-key-12345", 24);

        let token = service.issue("alice_01", Role::User).unwrap();
        let mut tampered = token.clone();
        tampered.pop();

        let result = service.verify(&tampered);
        assert!(matches!(result, Err(TokenError::Invalid)));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative validity puts the expiry well past the default leeway
        let service = TokenService::new("test-secret-key-12345", -1);

        let token = service.issue("alice_01", Role::User).unwrap();

        let result = service.verify(&token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_generated_secrets_are_distinct() {
        let a = generate_secret();
        let b = generate_secret();

        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
