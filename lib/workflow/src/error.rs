//! Error types for the workflow crate.
//!
//! - `GraphError`: the workflow is structurally invalid; callers surface it as
//!   a validation error and leave the workflow unmodified.
//! - `NodeFailure`: a node refused to process a message; this is recorded in
//!   the run result as the normal failed outcome, not returned as an error.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural problems with a workflow's node graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Node with the given ID was not found in the workflow.
    NodeNotFound { node_id: NodeId },
    /// Two nodes share the same id.
    DuplicateNode { node_id: NodeId },
    /// A node depends on an id that is not part of the workflow.
    DanglingDependency { node_id: NodeId, dependency: NodeId },
    /// The dependency relation has a cycle. Lists every node that could not
    /// be ordered, in ascending id order.
    CycleDetected { unresolved: Vec<NodeId> },
    /// The workflow has no INIT node.
    NoInitNode,
    /// The workflow has more than one INIT node.
    MultipleInitNodes { nodes: Vec<NodeId> },
    /// A node type tag outside the known set.
    UnknownNodeType { type_name: String },
    /// Every node id has been handed out.
    IdSpaceExhausted,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => write!(f, "node not found: {node_id}"),
            Self::DuplicateNode { node_id } => write!(f, "duplicate node id: {node_id}"),
            Self::DanglingDependency {
                node_id,
                dependency,
            } => {
                write!(f, "node {node_id} depends on missing node {dependency}")
            }
            Self::CycleDetected { unresolved } => {
                write!(f, "dependency cycle among {} node(s):", unresolved.len())?;
                for node_id in unresolved {
                    write!(f, " {node_id}")?;
                }
                Ok(())
            }
            Self::NoInitNode => write!(f, "workflow has no INIT node"),
            Self::MultipleInitNodes { nodes } => {
                write!(f, "workflow has {} INIT nodes, only one allowed", nodes.len())
            }
            Self::UnknownNodeType { type_name } => write!(f, "unknown node type '{type_name}'"),
            Self::IdSpaceExhausted => write!(f, "no node ids left in this workflow"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Why a node failed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeFailure {
    /// A CONDITION node saw a trigger user other than the expected one.
    ConditionNotMet { user_id: String },
    /// The node's type tag has no processing behavior.
    UnknownNodeType { type_name: String },
}

impl fmt::Display for NodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConditionNotMet { user_id } => {
                write!(f, "condition not met for user '{user_id}'")
            }
            Self::UnknownNodeType { type_name } => {
                write!(f, "unknown node type '{type_name}'")
            }
        }
    }
}

impl std::error::Error for NodeFailure {}
