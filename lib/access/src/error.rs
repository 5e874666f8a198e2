//! Error types for the access crate.

use crate::gate::Action;
use flowgate_core::UserId;
use std::fmt;

/// Errors from authorization checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// The gate refused the action.
    PermissionDenied {
        user_id: UserId,
        action: Action,
        resource: String,
    },
    /// A platform-level operation was attempted by a non-admin.
    AdminRequired { user_id: UserId },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied {
                user_id,
                action,
                resource,
            } => {
                write!(f, "user {user_id} lacks permission to {action} on {resource}")
            }
            Self::AdminRequired { user_id } => {
                write!(f, "user {user_id} is not an admin")
            }
        }
    }
}

impl std::error::Error for AuthorizationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_display() {
        let err = AuthorizationError::PermissionDenied {
            user_id: UserId::new(),
            action: Action::Execute,
            resource: "workflow:wf_123".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("lacks permission"));
        assert!(text.contains("execute"));
        assert!(text.contains("workflow:wf_123"));
    }

    #[test]
    fn admin_required_display() {
        let err = AuthorizationError::AdminRequired {
            user_id: UserId::new(),
        };
        assert!(err.to_string().contains("not an admin"));
    }
}
