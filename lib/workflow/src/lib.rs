//! Workflow model and execution building blocks for flowgate.
//!
//! This crate provides:
//!
//! - **Nodes**: typed processing steps (`INIT`, `CONDITION`, `MODIFY_MESSAGE`,
//!   `STORE_MESSAGE`) with dependency sets
//! - **Resolver**: deterministic topological ordering over the dependency graph
//! - **Dispatcher**: the per-type message transformation
//! - **Execution records**: per-node state machine and the run result
//! - **Workflow**: the owning record with statistics and content attachments

pub mod content;
pub mod definition;
pub mod dispatch;
pub mod error;
pub mod execution;
pub mod graph;
pub mod node;
pub mod trigger;

pub use content::{Content, ContentType};
pub use definition::{
    Workflow, WorkflowMetadata, WorkflowProgress, WorkflowStatistics, WorkflowSummary,
};
pub use dispatch::{Processed, process};
pub use error::{GraphError, NodeFailure};
pub use execution::{ExecutionResult, ExecutionState, NodeExecutionState, NodeOutcome, RunFailure};
pub use graph::{WorkflowGraph, resolve};
pub use node::{Node, NodeId, NodeSpec, NodeStatus, NodeType};
pub use trigger::{Trigger, TriggerType};
