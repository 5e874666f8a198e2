//! User domain type.
//!
//! Credentials and authentication happen outside this crate; a `User` here is
//! only what authorization needs: an id, a role and the workflows they own.

use crate::role::Role;
use chrono::{DateTime, Utc};
use flowgate_core::{UserId, WorkflowId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A registered user of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Internal platform user ID.
    id: UserId,
    /// Unique login name.
    username: String,
    /// Contact email, unique across users.
    email: String,
    /// Role used for access decisions on workflows the user does not own.
    role: Role,
    /// Workflows created by this user.
    owned_workflows: BTreeSet<WorkflowId>,
    /// When the user record was created.
    created_at: DateTime<Utc>,
    /// When the user record was last updated.
    updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with a freshly minted id.
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            role,
            owned_workflows: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the user's id.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the user's role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns true if the user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Changes the user's role.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    /// Records that the user owns `workflow_id`.
    pub fn add_owned_workflow(&mut self, workflow_id: WorkflowId) {
        if self.owned_workflows.insert(workflow_id) {
            self.updated_at = Utc::now();
        }
    }

    /// Returns true if the user's owned set contains `workflow_id`.
    #[must_use]
    pub fn owns(&self, workflow_id: WorkflowId) -> bool {
        self.owned_workflows.contains(&workflow_id)
    }

    /// Returns the owned workflow ids in ascending order.
    pub fn owned_workflows(&self) -> impl Iterator<Item = WorkflowId> + '_ {
        self.owned_workflows.iter().copied()
    }

    /// Returns when the user was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the user was last updated.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_owns_nothing() {
        let user = User::new("alice", "alice@example.com", Role::Basic);
        assert_eq!(user.username(), "alice");
        assert_eq!(user.email(), "alice@example.com");
        assert_eq!(user.role(), Role::Basic);
        assert_eq!(user.owned_workflows().count(), 0);
    }

    #[test]
    fn owned_workflows_are_deduplicated() {
        let mut user = User::new("bob", "bob@example.com", Role::Analyst);
        let wf = WorkflowId::new();
        user.add_owned_workflow(wf);
        user.add_owned_workflow(wf);

        assert!(user.owns(wf));
        assert!(!user.owns(WorkflowId::new()));
        assert_eq!(user.owned_workflows().count(), 1);
    }

    #[test]
    fn set_role_bumps_updated_at() {
        let mut user = User::new("carol", "carol@example.com", Role::Basic);
        let before = user.updated_at();
        user.set_role(Role::Admin);

        assert!(user.is_admin());
        assert!(user.updated_at() >= before);
    }
}
