//! Execution records for a single run.
//!
//! A run walks the resolved order once. Each node moves through
//! `Pending -> Running -> {Succeeded | Failed}`, or straight to `Skipped`
//! once an earlier node in the same run has failed.

use crate::error::NodeFailure;
use crate::node::{NodeId, NodeType};
use crate::trigger::Trigger;
use chrono::{DateTime, Utc};
use flowgate_core::{UserId, WorkflowId, WorkflowRunId};
use serde::{Deserialize, Serialize};

/// The overall state of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    /// Run is actively executing.
    Running,
    /// Every node succeeded.
    Completed,
    /// A node failed and the rest were skipped.
    Failed,
}

/// The execution state of a single node within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeExecutionState {
    /// Node has not been reached yet.
    Pending,
    /// Node is currently executing.
    Running,
    /// Node processed the message.
    Succeeded,
    /// Node refused the message.
    Failed,
    /// An earlier node failed, so this one never ran.
    Skipped,
}

impl NodeExecutionState {
    /// Returns true if this node stops the rest of the run.
    #[must_use]
    pub fn blocks_downstream(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// What happened to one node during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeOutcome {
    /// The node.
    pub node_id: NodeId,
    /// The node's type at the time of the run.
    pub node_type: NodeType,
    /// Final state.
    pub state: NodeExecutionState,
    /// Message the node received.
    pub input: Option<String>,
    /// Message the node passed on.
    pub output: Option<String>,
    /// Message recorded by a STORE_MESSAGE node.
    pub stored: Option<String>,
    /// Why the node failed.
    pub failure: Option<NodeFailure>,
    /// When execution started.
    pub started_at: Option<DateTime<Utc>>,
    /// When execution finished.
    pub finished_at: Option<DateTime<Utc>>,
}

impl NodeOutcome {
    /// Creates a pending outcome.
    #[must_use]
    pub fn new(node_id: NodeId, node_type: NodeType) -> Self {
        Self {
            node_id,
            node_type,
            state: NodeExecutionState::Pending,
            input: None,
            output: None,
            stored: None,
            failure: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Starts execution with `input`.
    pub fn start(&mut self, input: impl Into<String>) {
        self.state = NodeExecutionState::Running;
        self.started_at = Some(Utc::now());
        self.input = Some(input.into());
    }

    /// Marks the node as succeeded.
    pub fn succeed(&mut self, output: impl Into<String>, stored: Option<String>) {
        self.state = NodeExecutionState::Succeeded;
        self.finished_at = Some(Utc::now());
        self.output = Some(output.into());
        self.stored = stored;
    }

    /// Marks the node as failed.
    pub fn fail(&mut self, failure: NodeFailure) {
        self.state = NodeExecutionState::Failed;
        self.finished_at = Some(Utc::now());
        self.failure = Some(failure);
    }

    /// Marks the node as skipped.
    pub fn skip(&mut self) {
        self.state = NodeExecutionState::Skipped;
        self.finished_at = Some(Utc::now());
    }
}

/// The node that stopped a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    /// The failing node.
    pub node_id: NodeId,
    /// Why it failed.
    pub reason: NodeFailure,
}

/// The outcome of one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Unique identifier for this run.
    pub run_id: WorkflowRunId,
    /// The workflow that ran.
    pub workflow_id: WorkflowId,
    /// The user who requested the run.
    pub executed_by: UserId,
    /// The trigger the run was seeded from.
    pub trigger: Trigger,
    /// Overall state.
    pub state: ExecutionState,
    /// Per-node outcomes in execution order.
    pub outcomes: Vec<NodeOutcome>,
    /// Message as of the last node that succeeded.
    pub final_message: String,
    /// Set when the run failed.
    pub failure: Option<RunFailure>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExecutionResult {
    /// Creates a running result seeded with the trigger message.
    #[must_use]
    pub fn new(workflow_id: WorkflowId, executed_by: UserId, trigger: Trigger) -> Self {
        Self {
            run_id: WorkflowRunId::new(),
            workflow_id,
            executed_by,
            final_message: trigger.message.clone(),
            trigger,
            state: ExecutionState::Running,
            outcomes: Vec::new(),
            failure: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Appends a node outcome.
    pub fn push(&mut self, outcome: NodeOutcome) {
        self.outcomes.push(outcome);
    }

    /// Marks the run as completed.
    pub fn complete(&mut self, final_message: String) {
        self.state = ExecutionState::Completed;
        self.final_message = final_message;
        self.finished_at = Some(Utc::now());
    }

    /// Marks the run as failed.
    pub fn fail(&mut self, final_message: String, failure: RunFailure) {
        self.state = ExecutionState::Failed;
        self.final_message = final_message;
        self.failure = Some(failure);
        self.finished_at = Some(Utc::now());
    }

    /// Returns true if the run completed.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == ExecutionState::Completed
    }

    /// Returns the outcome for `node_id`.
    #[must_use]
    pub fn outcome(&self, node_id: NodeId) -> Option<&NodeOutcome> {
        self.outcomes.iter().find(|o| o.node_id == node_id)
    }

    /// Returns every message recorded by STORE_MESSAGE nodes, in order.
    pub fn stored_messages(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|o| o.stored.as_deref())
    }

    /// Returns the duration of the run, if it has finished.
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.finished_at? - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_failure_blocks_downstream() {
        assert!(!NodeExecutionState::Pending.blocks_downstream());
        assert!(!NodeExecutionState::Running.blocks_downstream());
        assert!(!NodeExecutionState::Succeeded.blocks_downstream());
        assert!(NodeExecutionState::Failed.blocks_downstream());
        assert!(!NodeExecutionState::Skipped.blocks_downstream());
    }

    #[test]
    fn node_outcome_lifecycle() {
        let mut outcome = NodeOutcome::new(NodeId::new(3), NodeType::StoreMessage);
        assert_eq!(outcome.state, NodeExecutionState::Pending);

        outcome.start("Hello");
        assert_eq!(outcome.state, NodeExecutionState::Running);
        assert!(outcome.started_at.is_some());

        outcome.succeed("Hello", Some("Hello".to_string()));
        assert_eq!(outcome.state, NodeExecutionState::Succeeded);
        assert_eq!(outcome.output.as_deref(), Some("Hello"));
        assert!(outcome.finished_at.is_some());
    }

    #[test]
    fn skipped_node_never_started() {
        let mut outcome = NodeOutcome::new(NodeId::new(4), NodeType::ModifyMessage);
        outcome.skip();

        assert_eq!(outcome.state, NodeExecutionState::Skipped);
        assert!(outcome.started_at.is_none());
        assert!(outcome.input.is_none());
    }

    #[test]
    fn failed_run_keeps_last_good_message() {
        let trigger = Trigger::new("Alice", "Hello");
        let mut result = ExecutionResult::new(WorkflowId::new(), UserId::new(), trigger);
        assert_eq!(result.final_message, "Hello");

        let failure = RunFailure {
            node_id: NodeId::new(2),
            reason: NodeFailure::ConditionNotMet {
                user_id: "Alice".to_string(),
            },
        };
        result.fail("Hello".to_string(), failure.clone());

        assert!(!result.succeeded());
        assert_eq!(result.failure, Some(failure));
        assert!(result.duration().is_some());
    }

    #[test]
    fn stored_messages_in_order() {
        let mut result =
            ExecutionResult::new(WorkflowId::new(), UserId::new(), Trigger::new("John", "a"));

        let mut first = NodeOutcome::new(NodeId::new(1), NodeType::StoreMessage);
        first.succeed("a", Some("a".to_string()));
        let mut second = NodeOutcome::new(NodeId::new(2), NodeType::ModifyMessage);
        second.succeed("a Hello", None);
        let mut third = NodeOutcome::new(NodeId::new(3), NodeType::StoreMessage);
        third.succeed("a Hello", Some("a Hello".to_string()));

        result.push(first);
        result.push(second);
        result.push(third);
        result.complete("a Hello".to_string());

        let stored: Vec<_> = result.stored_messages().collect();
        assert_eq!(stored, vec!["a", "a Hello"]);
        assert!(result.succeeded());
        assert!(result.outcome(NodeId::new(2)).is_some());
        assert!(result.outcome(NodeId::new(9)).is_none());
    }
}
