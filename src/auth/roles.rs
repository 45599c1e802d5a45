// Roles granted to authenticated users

use crate::users::models::User;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Capability granted to an authenticated identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::User => write!(f, "USER"),
        }
    }
}

/// Computes the roles attached to an identity once its token is accepted
///
/// Roles are not persisted with users. Swapping the resolver is enough to move
/// to a real role lookup; the authentication pipeline only sees this trait.
pub trait RoleResolver: Send + Sync {
    fn roles_for(&self, user: &User) -> BTreeSet<Role>;
}

/// Grants the same role set to every user
#[derive(Debug, Clone)]
pub struct StaticRoles {
    roles: BTreeSet<Role>,
}

impl StaticRoles {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }
}

impl Default for StaticRoles {
    fn default() -> Self {
        Self::new([Role::Admin, Role::User])
    }
}

impl RoleResolver for StaticRoles {
    fn roles_for(&self, _user: &User) -> BTreeSet<Role> {
        self.roles.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::models::test_user;

    #[test]
    fn test_default_grants_admin_and_user() {
        let roles = StaticRoles::default().roles_for(&test_user("alice"));
        assert_eq!(roles, BTreeSet::from([Role::Admin, Role::User]));
    }

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(Role::User.to_string(), "USER");
    }
}
