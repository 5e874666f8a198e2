//! Workflow execution engine for flowgate.
//!
//! This crate ties the access gate and the workflow model together:
//!
//! - **Repositories**: async storage traits for workflows and users, with
//!   in-memory implementations
//! - **Engine**: authorize, resolve, dispatch node by node, record statistics
//! - **Service**: the operations exposed to callers, each guarded by the gate
//!
//! # Example
//!
//! ```
//! use flowgate_engine::{InMemoryUserRepository, InMemoryWorkflowRepository, WorkflowService};
//! use flowgate_workflow::{NodeSpec, Trigger};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), rootcause::Report<flowgate_engine::EngineError>> {
//! let users = InMemoryUserRepository::with_admin("admin", "admin@example.com");
//! let service = WorkflowService::new(InMemoryWorkflowRepository::new(), users);
//! let owner = service.register_user("owner", "owner@example.com").await?.id();
//!
//! let workflow = service.create_workflow(owner, "greeting", None).await?;
//! let init = service.create_node(workflow.id, owner, NodeSpec::new("start", "INIT")).await?;
//! service
//!     .create_node(workflow.id, owner, NodeSpec::new("greet", "MODIFY_MESSAGE").depends_on(init))
//!     .await?;
//!
//! let result = service
//!     .execute_workflow(workflow.id, owner, Trigger::new("John", "Hello"))
//!     .await?;
//! assert_eq!(result.final_message, "Hello Hello");
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod repository;
pub mod service;

pub use engine::ExecutionEngine;
pub use error::EngineError;
pub use repository::{
    InMemoryUserRepository, InMemoryWorkflowRepository, UserRepository, WorkflowHandle,
    WorkflowRepository,
};
pub use service::WorkflowService;
