use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::users;

/// Coarse permission tier gating operation access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }

    /// Parses a stored role string. Unknown values resolve to the least
    /// privileged role rather than failing the whole row.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("ADMIN") {
            Self::Admin
        } else {
            Self::User
        }
    }

    /// Whether a caller holding this role satisfies `required`.
    #[must_use]
    pub const fn permits(self, required: Self) -> bool {
        match required {
            Self::User => true,
            Self::Admin => matches!(self, Self::Admin),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential row without the password hash. This is the only user shape
/// that ever leaves the db layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: Role::parse(&model.role),
            enabled: model.enabled,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Verified caller identity attached to each authenticated request.
///
/// Built from the store row, not from token claims, so role and status
/// changes take effect on the next request rather than at token expiry.
#[derive(Debug, Clone)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}
