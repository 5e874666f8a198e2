//! Core identifiers and error handling for flowgate.
//!
//! This crate provides the strongly-typed IDs and the `Result` alias shared
//! by the access gate, the workflow model and the execution engine.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ContentId, ParseIdError, UserId, WorkflowId, WorkflowRunId};
