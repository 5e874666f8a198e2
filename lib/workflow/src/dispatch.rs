//! Node type dispatcher.
//!
//! Each node type transforms the running message in one fixed way:
//!
//! | type             | effect                                              |
//! |------------------|-----------------------------------------------------|
//! | `INIT`           | passes the message through                          |
//! | `CONDITION`      | passes if the trigger user is `John`, else fails    |
//! | `MODIFY_MESSAGE` | appends `" Hello"`                                  |
//! | `STORE_MESSAGE`  | records the message in the run result, passes it on |

use crate::error::NodeFailure;
use crate::node::NodeType;
use crate::trigger::Trigger;

/// The only trigger user a CONDITION node lets through. Compared exactly.
pub const CONDITION_USER_ID: &str = "John";

/// Text appended by MODIFY_MESSAGE nodes.
pub const MODIFY_SUFFIX: &str = " Hello";

/// What a node produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    /// Message handed to the next node.
    pub message: String,
    /// Message recorded by a STORE_MESSAGE node.
    pub stored: Option<String>,
}

impl Processed {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stored: None,
        }
    }
}

/// Runs one node of type `node_type` over `message`.
///
/// # Errors
///
/// Returns `ConditionNotMet` when a CONDITION node sees another user and
/// `UnknownNodeType` for tags outside the known set.
pub fn process(
    node_type: &NodeType,
    message: &str,
    trigger: &Trigger,
) -> Result<Processed, NodeFailure> {
    match node_type {
        NodeType::Init => Ok(Processed::pass(message)),
        NodeType::Condition => {
            if trigger.user_id == CONDITION_USER_ID {
                Ok(Processed::pass(message))
            } else {
                Err(NodeFailure::ConditionNotMet {
                    user_id: trigger.user_id.clone(),
                })
            }
        }
        NodeType::ModifyMessage => Ok(Processed::pass(format!("{message}{MODIFY_SUFFIX}"))),
        NodeType::StoreMessage => Ok(Processed {
            message: message.to_string(),
            stored: Some(message.to_string()),
        }),
        NodeType::Unrecognized(type_name) => Err(NodeFailure::UnknownNodeType {
            type_name: type_name.clone(),
        }),
    }
}
