//! The workflow access gate.
//!
//! Maps `(user, resource, action)` to an allow/deny decision. The gate is a
//! pure function of its inputs; callers look up the user and the resource
//! owner and pass them in.

use crate::error::AuthorizationError;
use crate::user::User;
use flowgate_core::{UserId, WorkflowId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Actions that can be performed on a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// View a workflow, its nodes, statistics and content.
    Read,
    /// Add nodes or content, change node status labels.
    Write,
    /// Run the workflow against a trigger.
    Execute,
}

impl Action {
    /// Returns the action name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Execute => "execute",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource types guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    /// A workflow resource.
    Workflow,
}

impl ResourceType {
    /// Returns the resource type name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A guarded resource together with its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// The type of resource.
    pub resource_type: ResourceType,
    /// The resource ID.
    pub id: String,
    /// The user who created the resource.
    pub owner: UserId,
}

impl Resource {
    /// Creates a workflow resource.
    #[must_use]
    pub fn workflow(id: WorkflowId, owner: UserId) -> Self {
        Self {
            resource_type: ResourceType::Workflow,
            id: id.to_string(),
            owner,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.id)
    }
}

/// Why an action was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The user is an admin.
    Admin,
    /// The user owns the resource.
    Owner,
    /// The user's role allows the action on resources it does not own.
    Role,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The action is permitted.
    Allow(Grant),
    /// The action is refused.
    Deny,
}

impl Decision {
    /// Returns true if the decision permits the action.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Role- and ownership-based access gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGate;

impl AccessGate {
    /// Creates a gate.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decides whether `user` may perform `action` on `resource`.
    ///
    /// Admin beats ownership, ownership beats the role default.
    #[must_use]
    pub fn authorize(&self, user: &User, resource: &Resource, action: Action) -> Decision {
        let decision = if user.is_admin() {
            Decision::Allow(Grant::Admin)
        } else if resource.owner == user.id() {
            Decision::Allow(Grant::Owner)
        } else if user.role().allows(action) {
            Decision::Allow(Grant::Role)
        } else {
            Decision::Deny
        };

        debug!(
            user_id = %user.id(),
            role = %user.role(),
            %resource,
            %action,
            ?decision,
            "access decision"
        );

        decision
    }

    /// Like [`authorize`](Self::authorize) but turns a denial into an error.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the gate denies the action.
    pub fn require(
        &self,
        user: &User,
        resource: &Resource,
        action: Action,
    ) -> Result<Grant, AuthorizationError> {
        match self.authorize(user, resource, action) {
            Decision::Allow(grant) => Ok(grant),
            Decision::Deny => Err(AuthorizationError::PermissionDenied {
                user_id: user.id(),
                action,
                resource: resource.to_string(),
            }),
        }
    }

    /// Requires `user` to be an admin for platform-level operations.
    ///
    /// # Errors
    ///
    /// Returns `AdminRequired` for non-admin users.
    pub fn require_admin(&self, user: &User) -> Result<(), AuthorizationError> {
        if user.is_admin() {
            Ok(())
        } else {
            Err(AuthorizationError::AdminRequired { user_id: user.id() })
        }
    }
}
