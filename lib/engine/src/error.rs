//! Error types for the engine crate.
//!
//! Every variant aborts the operation before any state changes. Node failures
//! during a run are not errors; they are recorded in the `ExecutionResult`.

use flowgate_access::{Action, AuthorizationError};
use flowgate_core::{UserId, WorkflowId};
use flowgate_workflow::{GraphError, NodeId};
use std::fmt;

/// Errors returned by workflow service operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The access gate refused the action.
    PermissionDenied {
        user_id: UserId,
        action: Action,
        resource: String,
    },
    /// A user administration operation was attempted by a non-admin.
    AdminRequired { user_id: UserId },
    /// No workflow with this id.
    WorkflowNotFound { workflow_id: WorkflowId },
    /// No node with this id in the workflow.
    NodeNotFound {
        workflow_id: WorkflowId,
        node_id: NodeId,
    },
    /// No user with this id.
    UserNotFound { user_id: UserId },
    /// The workflow is structurally invalid.
    InvalidWorkflow(GraphError),
    /// The workflow is disabled and cannot be executed.
    WorkflowInactive { workflow_id: WorkflowId },
    /// Username or email already taken.
    DuplicateUser { field: &'static str, value: String },
}

impl EngineError {
    /// Returns true for the not-found family.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::WorkflowNotFound { .. } | Self::NodeNotFound { .. } | Self::UserNotFound { .. }
        )
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied {
                user_id,
                action,
                resource,
            } => write!(f, "permission denied: user {user_id} may not {action} {resource}"),
            Self::AdminRequired { user_id } => {
                write!(f, "permission denied: user {user_id} is not an admin")
            }
            Self::WorkflowNotFound { workflow_id } => {
                write!(f, "workflow not found: {workflow_id}")
            }
            Self::NodeNotFound {
                workflow_id,
                node_id,
            } => write!(f, "node {node_id} not found in workflow {workflow_id}"),
            Self::UserNotFound { user_id } => write!(f, "user not found: {user_id}"),
            Self::InvalidWorkflow(e) => write!(f, "invalid workflow: {e}"),
            Self::WorkflowInactive { workflow_id } => {
                write!(f, "workflow {workflow_id} is disabled")
            }
            Self::DuplicateUser { field, value } => {
                write!(f, "a user with {field} '{value}' already exists")
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<GraphError> for EngineError {
    fn from(e: GraphError) -> Self {
        Self::InvalidWorkflow(e)
    }
}

impl From<AuthorizationError> for EngineError {
    fn from(e: AuthorizationError) -> Self {
        match e {
            AuthorizationError::PermissionDenied {
                user_id,
                action,
                resource,
            } => Self::PermissionDenied {
                user_id,
                action,
                resource,
            },
            AuthorizationError::AdminRequired { user_id } => Self::AdminRequired { user_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_errors_become_invalid_workflow() {
        let err = EngineError::from(GraphError::NoInitNode);
        assert_eq!(err, EngineError::InvalidWorkflow(GraphError::NoInitNode));
        assert!(err.to_string().contains("no INIT node"));
    }

    #[test]
    fn authorization_errors_keep_their_details() {
        let user_id = UserId::new();
        let err = EngineError::from(AuthorizationError::PermissionDenied {
            user_id,
            action: Action::Write,
            resource: "workflow:wf_1".to_string(),
        });

        assert_eq!(
            err,
            EngineError::PermissionDenied {
                user_id,
                action: Action::Write,
                resource: "workflow:wf_1".to_string(),
            }
        );
        assert!(err.to_string().starts_with("permission denied"));
    }

    #[test]
    fn not_found_family() {
        assert!(EngineError::UserNotFound { user_id: UserId::new() }.is_not_found());
        assert!(
            EngineError::WorkflowNotFound {
                workflow_id: WorkflowId::new()
            }
            .is_not_found()
        );
        assert!(!EngineError::InvalidWorkflow(GraphError::NoInitNode).is_not_found());
    }
}
