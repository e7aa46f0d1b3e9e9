//! Role requirements and the caller's role membership.

use std::collections::HashSet;

use anyhow::{Result, anyhow};

use super::request::NavRequest;

/// Separators accepted in an item's `roles` string.
const ROLE_SEPARATORS: [char; 3] = [';', ',', ' '];

/// Split a role requirement string, ignoring empty segments.
pub fn split_roles(roles: &str) -> impl Iterator<Item = &str> {
    roles
        .split(&ROLE_SEPARATORS[..])
        .map(str::trim)
        .filter(|r| !r.is_empty())
}

/// Source of the current caller's role membership.
///
/// Failures are not fatal: the engine treats a failed lookup as "no
/// filtering" for that resolution.
pub trait RoleSource: Send + Sync {
    fn current_roles(&self, request: &NavRequest) -> Result<Vec<String>>;
}

/// Reads the roles attached to the request by the hosting pipeline.
///
/// Fails when the request carries no membership information.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestRoles;

impl RoleSource for RequestRoles {
    fn current_roles(&self, request: &NavRequest) -> Result<Vec<String>> {
        request
            .user_roles()
            .map(<[String]>::to_vec)
            .ok_or_else(|| anyhow!("no role membership attached to request"))
    }
}

/// Case-insensitive set of role names held by the caller.
#[derive(Debug, Clone, Default)]
pub struct RoleSet {
    roles: HashSet<String>,
}

impl RoleSet {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            roles: roles
                .into_iter()
                .map(|r| r.as_ref().trim().to_lowercase())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains(&role.to_lowercase())
    }

    /// Check that every role named in `required` is held.
    ///
    /// An empty requirement is always satisfied.
    pub fn satisfies(&self, required: &str) -> bool {
        split_roles(required).all(|role| self.contains(role))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn split_accepts_all_separators() {
        let roles: Vec<_> = split_roles("Admins;Users, Editors  Guests,,").collect();
        assert_eq!(roles, vec!["Admins", "Users", "Editors", "Guests"]);
    }

    #[test]
    fn empty_requirement_always_satisfied() {
        let set = RoleSet::new(Vec::<String>::new());
        assert!(set.satisfies(""));
        assert!(set.satisfies(" ;, "));
    }

    #[test]
    fn requirement_needs_every_role() {
        let set = RoleSet::new(["Admins", "Users"]);
        assert!(set.satisfies("admins"));
        assert!(set.satisfies("Admins;USERS"));
        assert!(!set.satisfies("Admins Editors"));

        let users = RoleSet::new(["Users"]);
        assert!(!users.satisfies("Admins"));
    }

    #[test]
    fn request_roles_fails_without_membership() {
        let request = NavRequest::new("Home", "Index");
        assert!(RequestRoles.current_roles(&request).is_err());

        let request = NavRequest::new("Home", "Index").with_user_roles(["Users"]);
        assert_eq!(RequestRoles.current_roles(&request).unwrap(), vec!["Users"]);
    }
}
