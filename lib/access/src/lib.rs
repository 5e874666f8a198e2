//! Users, roles and role-based access control for flowgate.
//!
//! This crate provides:
//! - The `User` record and its `Role`
//! - The `AccessGate`, which decides whether a user may read, write or
//!   execute a workflow
//! - Authorization error types
//!
//! # Access Control Model
//!
//! Decisions are evaluated in priority order:
//! 1. Admins may do anything.
//! 2. The owner of a workflow may do anything with it.
//! 3. Otherwise the role default applies: Analysts and Category Managers may
//!    read and write, Basic users may only read.
//!
//! # Example
//!
//! ```
//! use flowgate_access::{AccessGate, Action, Resource, Role, User};
//! use flowgate_core::WorkflowId;
//!
//! let owner = User::new("owner", "owner@example.com", Role::Basic);
//! let analyst = User::new("ana", "ana@example.com", Role::Analyst);
//! let resource = Resource::workflow(WorkflowId::new(), owner.id());
//!
//! let gate = AccessGate::new();
//! assert!(gate.authorize(&owner, &resource, Action::Execute).is_allowed());
//! assert!(gate.authorize(&analyst, &resource, Action::Write).is_allowed());
//! assert!(!gate.authorize(&analyst, &resource, Action::Execute).is_allowed());
//! ```

pub mod error;
pub mod gate;
pub mod role;
pub mod user;

pub use error::AuthorizationError;
pub use gate::{AccessGate, Action, Decision, Grant, Resource, ResourceType};
pub use role::Role;
pub use user::User;
