use thiserror::Error;

use crate::{Action, Capabilities, ClientKind, Role, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("inactive account")]
    Inactive,

    #[error("forbidden: role '{role}' may not {action}")]
    Forbidden { role: Role, action: Action },
}

/// Derive the actions a role is offered for a given client tag.
///
/// Mirrors the remote service's matrix:
/// - admin: everything
/// - user on `react`: read, update, delete
/// - user on `python`: read, update
pub fn capabilities_for(role: Role, client: ClientKind) -> Capabilities {
    match (role, client) {
        (Role::Admin, _) => Capabilities::ALL,
        (Role::User, ClientKind::React) => Capabilities {
            create: false,
            read: true,
            update: true,
            delete: true,
        },
        (Role::User, ClientKind::Python) => Capabilities {
            create: false,
            read: true,
            update: true,
            delete: false,
        },
    }
}

/// Check whether `user` should be offered `action`.
///
/// - No IO
/// - No panics
/// - Not an authorization boundary: the server re-checks every request
pub fn authorize(user: &User, client: ClientKind, action: Action) -> Result<(), AuthzError> {
    if !user.active {
        return Err(AuthzError::Inactive);
    }
    if capabilities_for(user.role, client).allows(action) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: user.role,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetctl_core::UserId;

    fn user(role: Role, active: bool) -> User {
        User {
            id: UserId::new(1),
            username: "u".to_string(),
            display_name: String::new(),
            email: None,
            role,
            active,
        }
    }

    #[test]
    fn admin_gets_everything() {
        for client in [ClientKind::React, ClientKind::Python] {
            assert_eq!(capabilities_for(Role::Admin, client), Capabilities::ALL);
        }
    }

    #[test]
    fn user_cannot_create_from_any_client() {
        for client in [ClientKind::React, ClientKind::Python] {
            assert!(!capabilities_for(Role::User, client).create);
        }
    }

    #[test]
    fn react_user_may_delete_python_user_may_not() {
        assert!(capabilities_for(Role::User, ClientKind::React).delete);
        assert!(!capabilities_for(Role::User, ClientKind::Python).delete);
        assert_eq!(
            capabilities_for(Role::User, ClientKind::Python).allowed(),
            vec![Action::Read, Action::Update]
        );
    }

    #[test]
    fn authorize_reports_the_missing_action() {
        let err = authorize(&user(Role::User, true), ClientKind::React, Action::Create).unwrap_err();
        assert_eq!(
            err,
            AuthzError::Forbidden {
                role: Role::User,
                action: Action::Create
            }
        );
        assert_eq!(err.to_string(), "forbidden: role 'user' may not create");
    }

    #[test]
    fn inactive_accounts_are_offered_nothing() {
        let err = authorize(&user(Role::Admin, false), ClientKind::React, Action::Read).unwrap_err();
        assert_eq!(err, AuthzError::Inactive);
    }
}
