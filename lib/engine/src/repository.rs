//! Repositories for workflows and users.
//!
//! Both are injected into the [`WorkflowService`](crate::WorkflowService) so
//! the engine can be exercised without any transport or storage layer. The
//! in-memory implementations hold everything for the life of the process.

use crate::error::EngineError;
use async_trait::async_trait;
use flowgate_access::{Role, User};
use flowgate_core::{UserId, WorkflowId};
use flowgate_workflow::Workflow;
use rootcause::prelude::Report;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// Exclusive handle on one workflow.
///
/// Holding the lock makes "read graph, resolve, run, write statistics" one
/// unit with respect to every other operation on the same workflow.
pub type WorkflowHandle = Arc<Mutex<Workflow>>;

/// Storage for workflows.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Stores a new workflow and returns its handle.
    async fn insert(&self, workflow: Workflow) -> WorkflowHandle;

    /// Returns the handle for `workflow_id`.
    async fn get(&self, workflow_id: WorkflowId) -> Result<WorkflowHandle, Report<EngineError>>;

    /// Returns every workflow handle, in ascending id order.
    async fn list(&self) -> Vec<WorkflowHandle>;
}

/// Storage for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// Fails with `DuplicateUser` if the username or email is taken.
    async fn insert(&self, user: User) -> Result<(), Report<EngineError>>;

    /// Returns a snapshot of the user.
    async fn get(&self, user_id: UserId) -> Result<User, Report<EngineError>>;

    /// Looks a user up by username.
    async fn find_by_username(&self, username: &str) -> Option<User>;

    /// Adds `workflow_id` to the user's owned set.
    async fn add_owned_workflow(
        &self,
        user_id: UserId,
        workflow_id: WorkflowId,
    ) -> Result<(), Report<EngineError>>;

    /// Replaces the user's role and returns the updated user.
    async fn set_role(&self, user_id: UserId, role: Role) -> Result<User, Report<EngineError>>;
}

/// Workflows held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowRepository {
    workflows: RwLock<HashMap<WorkflowId, WorkflowHandle>>,
}

impl InMemoryWorkflowRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn insert(&self, workflow: Workflow) -> WorkflowHandle {
        let workflow_id = workflow.id;
        let handle = Arc::new(Mutex::new(workflow));
        self.workflows
            .write()
            .await
            .insert(workflow_id, Arc::clone(&handle));
        handle
    }

    async fn get(&self, workflow_id: WorkflowId) -> Result<WorkflowHandle, Report<EngineError>> {
        self.workflows
            .read()
            .await
            .get(&workflow_id)
            .cloned()
            .ok_or_else(|| EngineError::WorkflowNotFound { workflow_id }.into())
    }

    async fn list(&self) -> Vec<WorkflowHandle> {
        let workflows = self.workflows.read().await;
        let mut entries: Vec<_> = workflows.iter().collect();
        entries.sort_by_key(|(id, _)| **id);
        entries
            .into_iter()
            .map(|(_, handle)| Arc::clone(handle))
            .collect()
    }
}

/// Users held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded with one Admin user.
    #[must_use]
    pub fn with_admin(username: impl Into<String>, email: impl Into<String>) -> Self {
        let admin = User::new(username, email, Role::Admin);
        info!(user_id = %admin.id(), username = %admin.username(), "seeded admin user");
        Self {
            users: RwLock::new(HashMap::from([(admin.id(), admin)])),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> Result<(), Report<EngineError>> {
        let mut users = self.users.write().await;

        for existing in users.values() {
            if existing.username() == user.username() {
                return Err(EngineError::DuplicateUser {
                    field: "username",
                    value: user.username().to_string(),
                }
                .into());
            }
            if existing.email() == user.email() {
                return Err(EngineError::DuplicateUser {
                    field: "email",
                    value: user.email().to_string(),
                }
                .into());
            }
        }

        users.insert(user.id(), user);
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<User, Report<EngineError>> {
        self.users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(|| EngineError::UserNotFound { user_id }.into())
    }

    async fn find_by_username(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|user| user.username() == username)
            .cloned()
    }

    async fn add_owned_workflow(
        &self,
        user_id: UserId,
        workflow_id: WorkflowId,
    ) -> Result<(), Report<EngineError>> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or(EngineError::UserNotFound { user_id })?;
        user.add_owned_workflow(workflow_id);
        Ok(())
    }

    async fn set_role(&self, user_id: UserId, role: Role) -> Result<User, Report<EngineError>> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or(EngineError::UserNotFound { user_id })?;
        user.set_role(role);
        Ok(user.clone())
    }
}
