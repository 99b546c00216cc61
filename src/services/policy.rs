//! Operation-level access policy.
//!
//! Every privileged operation is an [`Operation`] variant with a required
//! role, and services call [`authorize`] before doing work. Adding an
//! operation means adding a variant and one match arm, not another scattered
//! role conditional.

use std::fmt;

use thiserror::Error;

use crate::models::{Identity, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListUsers,
    RegisterUser,
    ChangeOwnPassword,
    ChangeOtherPassword,
    SetUserStatus,
    ReadOrders,
    MutateOrders,
    ReadItems,
    MutateItems,
}

impl Operation {
    /// Minimum role a caller must hold for this operation
    #[must_use]
    pub const fn required_role(self) -> Role {
        match self {
            Self::ChangeOwnPassword | Self::ReadOrders | Self::ReadItems => Role::User,
            Self::ListUsers
            | Self::RegisterUser
            | Self::ChangeOtherPassword
            | Self::SetUserStatus
            | Self::MutateOrders
            | Self::MutateItems => Role::Admin,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ListUsers => "listing users",
            Self::RegisterUser => "user registration",
            Self::ChangeOwnPassword => "changing own password",
            Self::ChangeOtherPassword => "changing another user's password",
            Self::SetUserStatus => "changing user status",
            Self::ReadOrders => "reading orders",
            Self::MutateOrders => "modifying orders",
            Self::ReadItems => "reading order items",
            Self::MutateItems => "modifying order items",
        };
        f.write_str(name)
    }
}

/// Refusal carrying enough context for a useful 403 message.
#[derive(Debug, Clone, Error)]
#[error("{operation} requires the {required} role")]
pub struct AccessDenied {
    pub operation: Operation,
    pub required: Role,
}

/// Check the caller's role against the operation's requirement
pub fn authorize(identity: &Identity, operation: Operation) -> Result<(), AccessDenied> {
    let required = operation.required_role();
    if identity.role.permits(required) {
        Ok(())
    } else {
        Err(AccessDenied {
            operation,
            required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            username: "someone".to_string(),
            role,
        }
    }

    #[test]
    fn test_admin_passes_everything() {
        let admin = identity(Role::Admin);
        for op in [
            Operation::ListUsers,
            Operation::RegisterUser,
            Operation::ChangeOwnPassword,
            Operation::ChangeOtherPassword,
            Operation::SetUserStatus,
            Operation::ReadOrders,
            Operation::MutateOrders,
            Operation::ReadItems,
            Operation::MutateItems,
        ] {
            assert!(authorize(&admin, op).is_ok(), "admin denied {op}");
        }
    }

    #[test]
    fn test_user_passes_only_user_level_operations() {
        let user = identity(Role::User);

        assert!(authorize(&user, Operation::ChangeOwnPassword).is_ok());
        assert!(authorize(&user, Operation::ReadOrders).is_ok());
        assert!(authorize(&user, Operation::ReadItems).is_ok());

        for op in [
            Operation::ListUsers,
            Operation::RegisterUser,
            Operation::ChangeOtherPassword,
            Operation::SetUserStatus,
            Operation::MutateOrders,
            Operation::MutateItems,
        ] {
            assert!(authorize(&user, op).is_err(), "user allowed {op}");
        }
    }

    #[test]
    fn test_denial_names_the_operation_and_role() {
        let user = identity(Role::User);

        let err = authorize(&user, Operation::SetUserStatus).unwrap_err();
        assert_eq!(err.required, Role::Admin);
        assert_eq!(
            err.to_string(),
            "changing user status requires the ADMIN role"
        );
    }
}
