//! Roles for workflow access control.
//!
//! Every user carries exactly one role. The role determines what a user may do
//! with workflows they do not own.

use crate::gate::Action;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform role assigned to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to every workflow and to user administration.
    Admin,
    /// Reads and edits workflows owned by others.
    Analyst,
    /// Reads and edits workflows owned by others.
    CategoryManager,
    /// Reads workflows owned by others.
    #[default]
    Basic,
}

impl Role {
    /// Returns true if this role has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role grants `action` on a workflow the user does not own.
    ///
    /// Ownership is checked by the gate before this default is consulted.
    #[must_use]
    pub fn allows(&self, action: Action) -> bool {
        match self {
            Self::Admin => true,
            Self::Analyst | Self::CategoryManager => {
                matches!(action, Action::Read | Action::Write)
            }
            Self::Basic => matches!(action, Action::Read),
        }
    }

    /// Returns the display name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Analyst => "Analyst",
            Self::CategoryManager => "Category Manager",
            Self::Basic => "Basic",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Analyst.is_admin());
        assert!(!Role::CategoryManager.is_admin());
        assert!(!Role::Basic.is_admin());
    }

    #[test]
    fn editor_roles_read_and_write_but_never_execute() {
        for role in [Role::Analyst, Role::CategoryManager] {
            assert!(role.allows(Action::Read));
            assert!(role.allows(Action::Write));
            assert!(!role.allows(Action::Execute));
        }
    }

    #[test]
    fn basic_role_is_read_only() {
        assert!(Role::Basic.allows(Action::Read));
        assert!(!Role::Basic.allows(Action::Write));
        assert!(!Role::Basic.allows(Action::Execute));
    }

    #[test]
    fn default_role_is_basic() {
        assert_eq!(Role::default(), Role::Basic);
    }

    #[test]
    fn role_serialization_format() {
        let json = serde_json::to_string(&Role::CategoryManager).expect("serialize");
        assert_eq!(json, "\"category_manager\"");

        let parsed: Role = serde_json::from_str("\"analyst\"").expect("deserialize");
        assert_eq!(parsed, Role::Analyst);
    }
}
