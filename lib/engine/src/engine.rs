//! The execution engine.
//!
//! One execution runs entirely against a workflow the caller has already
//! locked:
//!
//! 1. Ask the gate whether the user may execute the workflow
//! 2. Check the workflow is enabled and has exactly one INIT node
//! 3. Resolve the execution order
//! 4. Feed the trigger message through each node in order
//! 5. Record the outcome in the workflow's statistics
//!
//! Steps 1 to 3 fail without touching the workflow. Once step 4 starts, a
//! node failure stops the run and every node not yet dispatched is skipped,
//! whether or not it depends on the failed node.

use crate::error::EngineError;
use chrono::Utc;
use flowgate_access::{AccessGate, Action, Resource, User};
use flowgate_workflow::{
    ExecutionResult, NodeOutcome, Processed, RunFailure, Trigger, Workflow, process,
};
use rootcause::prelude::Report;
use tracing::{debug, info, warn};

/// Runs workflows against triggers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionEngine {
    gate: AccessGate,
}

impl ExecutionEngine {
    /// Creates an engine that authorizes through `gate`.
    #[must_use]
    pub fn new(gate: AccessGate) -> Self {
        Self { gate }
    }

    /// Executes `workflow` as `user`.
    ///
    /// A failed node is not an error: the returned result describes it.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied`, `WorkflowInactive` or `InvalidWorkflow`
    /// before any node runs and before statistics change.
    pub fn execute(
        &self,
        workflow: &mut Workflow,
        user: &User,
        trigger: Trigger,
    ) -> Result<ExecutionResult, Report<EngineError>> {
        let resource = Resource::workflow(workflow.id, workflow.owner);
        self.gate
            .require(user, &resource, Action::Execute)
            .map_err(EngineError::from)?;

        if !workflow.is_enabled() {
            return Err(EngineError::WorkflowInactive {
                workflow_id: workflow.id,
            }
            .into());
        }

        workflow.init_node().map_err(EngineError::from)?;
        let order = workflow.execution_order().map_err(EngineError::from)?;

        let mut result = ExecutionResult::new(workflow.id, user.id(), trigger);
        info!(
            workflow_id = %workflow.id,
            run_id = %result.run_id,
            nodes = order.len(),
            "starting workflow run"
        );

        let mut message = result.trigger.message.clone();
        let mut failure: Option<RunFailure> = None;

        for node_id in order {
            let node = workflow
                .node(node_id)
                .ok_or(EngineError::NodeNotFound {
                    workflow_id: workflow.id,
                    node_id,
                })?;
            let mut outcome = NodeOutcome::new(node_id, node.node_type.clone());

            if failure.is_some() {
                outcome.skip();
                result.push(outcome);
                continue;
            }

            outcome.start(message.as_str());
            match process(&node.node_type, &message, &result.trigger) {
                Ok(Processed {
                    message: next,
                    stored,
                }) => {
                    debug!(%node_id, node_type = %node.node_type, "node succeeded");
                    outcome.succeed(next.as_str(), stored);
                    message = next;
                }
                Err(reason) => {
                    warn!(%node_id, node_type = %node.node_type, %reason, "node failed");
                    outcome.fail(reason);
                }
            }
            if outcome.state.blocks_downstream() {
                failure = outcome.failure.clone().map(|reason| RunFailure { node_id, reason });
            }
            result.push(outcome);
        }

        match failure {
            Some(failure) => result.fail(message, failure),
            None => result.complete(message),
        }

        let finished_at = result.finished_at.unwrap_or_else(Utc::now);
        workflow.record_run(result.succeeded(), finished_at);

        info!(
            workflow_id = %workflow.id,
            run_id = %result.run_id,
            state = ?result.state,
            duration_ms = result.duration().map(|d| d.num_milliseconds()),
            run_count = workflow.statistics.run_count,
            "workflow run finished"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgate_access::Role;
    use flowgate_workflow::{
        ExecutionState, GraphError, Node, NodeExecutionState, NodeFailure, NodeId, NodeSpec,
        NodeType, WorkflowStatistics,
    };

    fn owner() -> User {
        User::new("owner", "owner@example.com", Role::Basic)
    }

    /// INIT -> CONDITION -> MODIFY_MESSAGE as a chain.
    fn chain(owner: &User) -> Workflow {
        let mut workflow = Workflow::new(owner.id(), "greeting");
        let init = workflow
            .create_node(NodeSpec::new("start", "INIT"))
            .expect("init");
        let check = workflow
            .create_node(NodeSpec::new("is john", "CONDITION").depends_on(init))
            .expect("condition");
        workflow
            .create_node(NodeSpec::new("greet", "MODIFY_MESSAGE").depends_on(check))
            .expect("modify");
        workflow
    }

    fn states(result: &ExecutionResult) -> Vec<NodeExecutionState> {
        result.outcomes.iter().map(|o| o.state).collect()
    }

    #[test]
    fn john_passes_the_condition() {
        let owner = owner();
        let mut workflow = chain(&owner);

        let result = ExecutionEngine::default()
            .execute(&mut workflow, &owner, Trigger::new("John", "Hello"))
            .expect("execute");

        assert_eq!(result.state, ExecutionState::Completed);
        assert_eq!(result.final_message, "Hello Hello");
        assert_eq!(result.failure, None);
        assert_eq!(
            states(&result),
            vec![NodeExecutionState::Succeeded; 3]
        );
        assert_eq!(workflow.statistics.run_count, 1);
        assert_eq!(workflow.statistics.success_count, 1);
    }

    #[test]
    fn alice_fails_the_condition_and_skips_the_rest() {
        let owner = owner();
        let mut workflow = chain(&owner);

        let result = ExecutionEngine::default()
            .execute(&mut workflow, &owner, Trigger::new("Alice", "Hello"))
            .expect("execute");

        assert_eq!(result.state, ExecutionState::Failed);
        assert_eq!(result.final_message, "Hello");
        assert_eq!(
            states(&result),
            vec![
                NodeExecutionState::Succeeded,
                NodeExecutionState::Failed,
                NodeExecutionState::Skipped,
            ]
        );

        let failure = result.failure.expect("failure recorded");
        assert_eq!(failure.node_id, NodeId::new(2));
        assert_eq!(
            failure.reason,
            NodeFailure::ConditionNotMet {
                user_id: "Alice".to_string()
            }
        );
        assert_eq!(workflow.statistics.failure_count, 1);
    }

    #[test]
    fn failure_skips_independent_nodes_too() {
        let owner = owner();
        let mut workflow = chain(&owner);
        // Depends only on INIT, so it is not downstream of the CONDITION.
        let side = workflow
            .create_node(NodeSpec::new("side", "STORE_MESSAGE").depends_on(NodeId::new(1)))
            .expect("store");

        let result = ExecutionEngine::default()
            .execute(&mut workflow, &owner, Trigger::new("Alice", "Hello"))
            .expect("execute");

        let outcome = result.outcome(side).expect("outcome");
        assert_eq!(outcome.state, NodeExecutionState::Skipped);
        assert_eq!(result.stored_messages().count(), 0);
    }

    #[test]
    fn store_message_is_reported() {
        let owner = owner();
        let mut workflow = chain(&owner);
        workflow
            .create_node(NodeSpec::new("keep", "STORE_MESSAGE").depends_on(NodeId::new(3)))
            .expect("store");

        let result = ExecutionEngine::default()
            .execute(&mut workflow, &owner, Trigger::new("John", "Hi"))
            .expect("execute");

        let stored: Vec<_> = result.stored_messages().collect();
        assert_eq!(stored, vec!["Hi Hello"]);
        let outcome = result.outcome(NodeId::new(4)).expect("outcome");
        assert_eq!(outcome.input.as_deref(), Some("Hi Hello"));
    }

    #[test]
    fn basic_non_owner_is_denied_before_anything_runs() {
        let owner = owner();
        let stranger = User::new("basic", "basic@example.com", Role::Basic);
        let mut workflow = chain(&owner);

        let err = ExecutionEngine::default()
            .execute(&mut workflow, &stranger, Trigger::new("John", "Hello"))
            .expect_err("denied");

        assert!(matches!(
            err.current_context(),
            EngineError::PermissionDenied {
                action: Action::Execute,
                ..
            }
        ));
        assert_eq!(workflow.statistics, WorkflowStatistics::default());
    }

    #[test]
    fn editor_roles_cannot_execute_others_workflows() {
        let owner = owner();
        let mut workflow = chain(&owner);

        for role in [Role::Analyst, Role::CategoryManager] {
            let user = User::new("editor", "editor@example.com", role);
            let result =
                ExecutionEngine::default().execute(&mut workflow, &user, Trigger::new("John", "x"));
            assert!(result.is_err(), "{role}");
        }
        assert_eq!(workflow.statistics.run_count, 0);
    }

    #[test]
    fn admin_may_execute_any_workflow() {
        let owner = owner();
        let admin = User::new("admin", "admin@example.com", Role::Admin);
        let mut workflow = chain(&owner);

        let result = ExecutionEngine::default()
            .execute(&mut workflow, &admin, Trigger::new("John", "Hello"))
            .expect("execute");
        assert_eq!(result.executed_by, admin.id());
    }

    #[test]
    fn missing_init_is_rejected_without_stats() {
        let owner = owner();
        let mut workflow = Workflow::new(owner.id(), "no init");
        workflow
            .create_node(NodeSpec::new("greet", "MODIFY_MESSAGE"))
            .expect("modify");

        let err = ExecutionEngine::default()
            .execute(&mut workflow, &owner, Trigger::new("John", "Hello"))
            .expect_err("no init");

        assert_eq!(
            err.current_context(),
            &EngineError::InvalidWorkflow(GraphError::NoInitNode)
        );
        assert_eq!(workflow.statistics.run_count, 0);
    }

    #[test]
    fn restored_second_init_is_rejected_without_stats() {
        let owner = owner();
        let mut workflow = Workflow::new(owner.id(), "restored");
        workflow.add_node(Node::new(NodeId::new(1), "start", NodeType::Init));
        workflow.add_node(Node::new(NodeId::new(2), "again", NodeType::Init));
        workflow.add_node(
            Node::new(NodeId::new(3), "greet", NodeType::ModifyMessage).depends_on(NodeId::new(1)),
        );

        let err = ExecutionEngine::default()
            .execute(&mut workflow, &owner, Trigger::new("John", "Hello"))
            .expect_err("two init nodes");

        assert_eq!(
            err.current_context(),
            &EngineError::InvalidWorkflow(GraphError::MultipleInitNodes {
                nodes: vec![NodeId::new(1), NodeId::new(2)]
            })
        );
        assert_eq!(workflow.statistics, WorkflowStatistics::default());
    }

    #[test]
    fn disabled_workflow_is_inactive() {
        let owner = owner();
        let mut workflow = chain(&owner);
        workflow.disable();

        let err = ExecutionEngine::default()
            .execute(&mut workflow, &owner, Trigger::new("John", "Hello"))
            .expect_err("disabled");

        assert!(matches!(
            err.current_context(),
            EngineError::WorkflowInactive { .. }
        ));
        assert_eq!(workflow.statistics.run_count, 0);
    }

    #[test]
    fn restored_cycle_surfaces_resolver_error() {
        let owner = owner();
        let mut workflow = Workflow::new(owner.id(), "restored");
        workflow.add_node(Node::new(NodeId::new(1), "start", NodeType::Init));
        workflow.add_node(
            Node::new(NodeId::new(2), "a", NodeType::ModifyMessage).depends_on(NodeId::new(3)),
        );
        workflow.add_node(
            Node::new(NodeId::new(3), "b", NodeType::ModifyMessage).depends_on(NodeId::new(2)),
        );

        let err = ExecutionEngine::default()
            .execute(&mut workflow, &owner, Trigger::new("John", "Hello"))
            .expect_err("cycle");

        assert!(matches!(
            err.current_context(),
            EngineError::InvalidWorkflow(GraphError::CycleDetected { .. })
        ));
        assert_eq!(workflow.statistics.run_count, 0);
    }

    #[test]
    fn restored_unknown_type_fails_the_run() {
        let owner = owner();
        let mut workflow = Workflow::new(owner.id(), "restored");
        workflow.add_node(Node::new(NodeId::new(1), "start", NodeType::Init));
        workflow.add_node(
            Node::new(NodeId::new(2), "mail", NodeType::from_tag("SEND_EMAIL"))
                .depends_on(NodeId::new(1)),
        );

        let result = ExecutionEngine::default()
            .execute(&mut workflow, &owner, Trigger::new("John", "Hello"))
            .expect("execute");

        assert!(!result.succeeded());
        assert_eq!(
            result.failure.map(|f| f.reason),
            Some(NodeFailure::UnknownNodeType {
                type_name: "SEND_EMAIL".to_string()
            })
        );
        assert_eq!(workflow.statistics.failure_count, 1);
    }
}
