//! The workflow service.
//!
//! Every operation looks up the requester, locks the target workflow, asks
//! the access gate, and only then reads or mutates. The workflow lock is held
//! until the operation returns, so concurrent executions and edits against
//! the same workflow never interleave.

use crate::engine::ExecutionEngine;
use crate::error::EngineError;
use crate::repository::{UserRepository, WorkflowRepository};
use flowgate_access::{AccessGate, Action, Resource, Role, User};
use flowgate_core::{UserId, WorkflowId};
use flowgate_workflow::{
    Content, ContentType, ExecutionResult, GraphError, Node, NodeId, NodeSpec, NodeStatus, Trigger,
    Workflow, WorkflowProgress, WorkflowStatistics, WorkflowSummary,
};
use rootcause::prelude::Report;
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument};

/// Entry point for every workflow and user operation.
pub struct WorkflowService<W: WorkflowRepository, U: UserRepository> {
    workflows: W,
    users: U,
    gate: AccessGate,
    engine: ExecutionEngine,
}

impl<W: WorkflowRepository, U: UserRepository> WorkflowService<W, U> {
    /// Creates a service over the given repositories.
    pub fn new(workflows: W, users: U) -> Self {
        let gate = AccessGate::new();
        Self {
            workflows,
            users,
            gate,
            engine: ExecutionEngine::new(gate),
        }
    }

    /// Returns the user repository.
    pub fn users(&self) -> &U {
        &self.users
    }

    /// Returns the workflow repository.
    pub fn workflows(&self) -> &W {
        &self.workflows
    }

    fn authorize(
        &self,
        user: &User,
        workflow: &Workflow,
        action: Action,
    ) -> Result<(), Report<EngineError>> {
        let resource = Resource::workflow(workflow.id, workflow.owner);
        self.gate
            .require(user, &resource, action)
            .map_err(EngineError::from)?;
        Ok(())
    }

    /// Registers a Basic user.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateUser` if the username or email is taken.
    #[instrument(skip(self))]
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
    ) -> Result<User, Report<EngineError>> {
        let user = User::new(username, email, Role::default());
        self.users.insert(user.clone()).await?;
        info!(user_id = %user.id(), "registered user");
        Ok(user)
    }

    /// Changes a user's role. Only admins may do this.
    ///
    /// # Errors
    ///
    /// Returns `AdminRequired` for non-admin requesters and `UserNotFound`
    /// for unknown ids.
    #[instrument(skip(self), fields(requester = %requester, user_id = %user_id))]
    pub async fn assign_role(
        &self,
        requester: UserId,
        user_id: UserId,
        role: Role,
    ) -> Result<User, Report<EngineError>> {
        let admin = self.users.get(requester).await?;
        self.gate.require_admin(&admin).map_err(EngineError::from)?;

        let user = self.users.set_role(user_id, role).await?;
        info!(%role, "assigned role");
        Ok(user)
    }

    /// Creates an empty workflow owned by the requester.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the requester is not registered.
    #[instrument(skip(self, description), fields(requester = %requester))]
    pub async fn create_workflow(
        &self,
        requester: UserId,
        name: &str,
        description: Option<String>,
    ) -> Result<Workflow, Report<EngineError>> {
        let owner = self.users.get(requester).await?;

        let mut workflow = Workflow::new(owner.id(), name);
        workflow.metadata.description = description;
        let snapshot = workflow.clone();

        self.workflows.insert(workflow).await;
        self.users
            .add_owned_workflow(owner.id(), snapshot.id)
            .await?;

        info!(workflow_id = %snapshot.id, "created workflow");
        Ok(snapshot)
    }

    /// Returns a snapshot of the workflow. Requires Read.
    ///
    /// # Errors
    ///
    /// Returns a not-found error or `PermissionDenied`.
    #[instrument(skip(self), fields(workflow_id = %workflow_id, requester = %requester))]
    pub async fn get_workflow(
        &self,
        workflow_id: WorkflowId,
        requester: UserId,
    ) -> Result<Workflow, Report<EngineError>> {
        let user = self.users.get(requester).await?;
        let handle = self.workflows.get(workflow_id).await?;
        let workflow = handle.lock().await;

        self.authorize(&user, &workflow, Action::Read)?;
        Ok(workflow.clone())
    }

    /// Lists the workflows the requester may read.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the requester is not registered.
    #[instrument(skip(self), fields(requester = %requester))]
    pub async fn list_workflows(
        &self,
        requester: UserId,
    ) -> Result<Vec<WorkflowSummary>, Report<EngineError>> {
        let user = self.users.get(requester).await?;

        let mut summaries = Vec::new();
        for handle in self.workflows.list().await {
            let workflow = handle.lock().await;
            let resource = Resource::workflow(workflow.id, workflow.owner);
            if self
                .gate
                .authorize(&user, &resource, Action::Read)
                .is_allowed()
            {
                summaries.push(WorkflowSummary::from(&*workflow));
            }
        }

        debug!(count = summaries.len(), "listed workflows");
        Ok(summaries)
    }

    /// Adds a node. Requires Write.
    ///
    /// # Errors
    ///
    /// Returns a not-found error, `PermissionDenied`, or `InvalidWorkflow`
    /// for an unknown type, a dangling dependency, a second INIT node or a
    /// cycle. On error the workflow is unchanged.
    #[instrument(skip(self, spec), fields(workflow_id = %workflow_id, requester = %requester, node_type = %spec.node_type))]
    pub async fn create_node(
        &self,
        workflow_id: WorkflowId,
        requester: UserId,
        spec: NodeSpec,
    ) -> Result<NodeId, Report<EngineError>> {
        let user = self.users.get(requester).await?;
        let handle = self.workflows.get(workflow_id).await?;
        let mut workflow = handle.lock().await;

        self.authorize(&user, &workflow, Action::Write)?;
        let node_id = workflow.create_node(spec).map_err(EngineError::from)?;

        info!(%node_id, "created node");
        Ok(node_id)
    }

    /// Returns a node including its status label. Requires Read.
    ///
    /// # Errors
    ///
    /// Returns a not-found error or `PermissionDenied`.
    #[instrument(skip(self), fields(workflow_id = %workflow_id, node_id = %node_id, requester = %requester))]
    pub async fn get_node(
        &self,
        workflow_id: WorkflowId,
        node_id: NodeId,
        requester: UserId,
    ) -> Result<Node, Report<EngineError>> {
        let user = self.users.get(requester).await?;
        let handle = self.workflows.get(workflow_id).await?;
        let workflow = handle.lock().await;

        self.authorize(&user, &workflow, Action::Read)?;
        let node = workflow.node(node_id).ok_or(EngineError::NodeNotFound {
            workflow_id,
            node_id,
        })?;
        Ok(node.clone())
    }

    /// Replaces a node's status label. Requires Write.
    ///
    /// The label has no effect on execution.
    ///
    /// # Errors
    ///
    /// Returns a not-found error or `PermissionDenied`.
    #[instrument(skip(self), fields(workflow_id = %workflow_id, node_id = %node_id, requester = %requester))]
    pub async fn update_node_status(
        &self,
        workflow_id: WorkflowId,
        node_id: NodeId,
        requester: UserId,
        status: NodeStatus,
    ) -> Result<(), Report<EngineError>> {
        let user = self.users.get(requester).await?;
        let handle = self.workflows.get(workflow_id).await?;
        let mut workflow = handle.lock().await;

        self.authorize(&user, &workflow, Action::Write)?;
        workflow
            .set_node_status(node_id, status)
            .map_err(|_| EngineError::NodeNotFound {
                workflow_id,
                node_id,
            })?;

        debug!("updated node status");
        Ok(())
    }

    /// Executes the workflow. Requires Execute.
    ///
    /// A failed run is returned as `Ok` with a failed result.
    ///
    /// # Errors
    ///
    /// Returns a not-found error, `PermissionDenied`, `WorkflowInactive` or
    /// `InvalidWorkflow`, all before any node runs.
    #[instrument(skip(self, trigger), fields(workflow_id = %workflow_id, requester = %requester))]
    pub async fn execute_workflow(
        &self,
        workflow_id: WorkflowId,
        requester: UserId,
        trigger: Trigger,
    ) -> Result<ExecutionResult, Report<EngineError>> {
        let user = self.users.get(requester).await?;
        let handle = self.workflows.get(workflow_id).await?;
        let mut workflow = handle.lock().await;

        self.engine.execute(&mut workflow, &user, trigger)
    }

    /// Returns the run counters. Requires Read.
    ///
    /// # Errors
    ///
    /// Returns a not-found error or `PermissionDenied`.
    #[instrument(skip(self), fields(workflow_id = %workflow_id, requester = %requester))]
    pub async fn get_statistics(
        &self,
        workflow_id: WorkflowId,
        requester: UserId,
    ) -> Result<WorkflowStatistics, Report<EngineError>> {
        let user = self.users.get(requester).await?;
        let handle = self.workflows.get(workflow_id).await?;
        let workflow = handle.lock().await;

        self.authorize(&user, &workflow, Action::Read)?;
        Ok(workflow.statistics.clone())
    }

    /// Returns node totals and completion. Requires Read.
    ///
    /// # Errors
    ///
    /// Returns a not-found error or `PermissionDenied`.
    #[instrument(skip(self), fields(workflow_id = %workflow_id, requester = %requester))]
    pub async fn get_progress(
        &self,
        workflow_id: WorkflowId,
        requester: UserId,
    ) -> Result<WorkflowProgress, Report<EngineError>> {
        let user = self.users.get(requester).await?;
        let handle = self.workflows.get(workflow_id).await?;
        let workflow = handle.lock().await;

        self.authorize(&user, &workflow, Action::Read)?;
        Ok(workflow.progress())
    }

    /// Enables or disables the workflow. Requires Write.
    ///
    /// # Errors
    ///
    /// Returns a not-found error or `PermissionDenied`.
    #[instrument(skip(self), fields(workflow_id = %workflow_id, requester = %requester))]
    pub async fn set_workflow_enabled(
        &self,
        workflow_id: WorkflowId,
        requester: UserId,
        enabled: bool,
    ) -> Result<WorkflowSummary, Report<EngineError>> {
        let user = self.users.get(requester).await?;
        let handle = self.workflows.get(workflow_id).await?;
        let mut workflow = handle.lock().await;

        self.authorize(&user, &workflow, Action::Write)?;
        if enabled {
            workflow.enable();
        } else {
            workflow.disable();
        }

        info!(enabled, "changed workflow state");
        Ok(WorkflowSummary::from(&*workflow))
    }

    /// Attaches content to the workflow, optionally about one node.
    /// Requires Write.
    ///
    /// # Errors
    ///
    /// Returns a not-found error or `PermissionDenied`.
    #[instrument(skip(self, data), fields(workflow_id = %workflow_id, requester = %requester, content_type = %content_type))]
    pub async fn add_content(
        &self,
        workflow_id: WorkflowId,
        requester: UserId,
        content_type: ContentType,
        data: JsonValue,
        node_id: Option<NodeId>,
    ) -> Result<Content, Report<EngineError>> {
        let user = self.users.get(requester).await?;
        let handle = self.workflows.get(workflow_id).await?;
        let mut workflow = handle.lock().await;

        self.authorize(&user, &workflow, Action::Write)?;

        let mut content = Content::new(workflow_id, content_type, data, user.id());
        if let Some(node_id) = node_id {
            content = content.for_node(node_id);
        }
        workflow
            .add_content(content.clone())
            .map_err(|e| match e {
                GraphError::NodeNotFound { node_id } => {
                    EngineError::NodeNotFound {
                        workflow_id,
                        node_id,
                    }
                }
                other => EngineError::from(other),
            })?;

        debug!(content_id = %content.id, "added content");
        Ok(content)
    }

    /// Lists attached content. Requires Read.
    ///
    /// # Errors
    ///
    /// Returns a not-found error or `PermissionDenied`.
    #[instrument(skip(self), fields(workflow_id = %workflow_id, requester = %requester))]
    pub async fn list_content(
        &self,
        workflow_id: WorkflowId,
        requester: UserId,
    ) -> Result<Vec<Content>, Report<EngineError>> {
        let user = self.users.get(requester).await?;
        let handle = self.workflows.get(workflow_id).await?;
        let workflow = handle.lock().await;

        self.authorize(&user, &workflow, Action::Read)?;
        Ok(workflow.contents().to_vec())
    }
}
