//! Command-line runner for flowgate.
//!
//! Builds a workflow from a JSON definition, executes it once as the seeded
//! Admin user and returns the run result.

pub mod config;
pub mod definition;
pub mod error;

use crate::config::RunnerConfig;
use crate::definition::{WorkflowDefinition, read_json};
use crate::error::RunnerError;
use flowgate_engine::{
    InMemoryUserRepository, InMemoryWorkflowRepository, UserRepository, WorkflowService,
};
use flowgate_workflow::{ExecutionResult, Trigger};
use rootcause::prelude::ResultExt;
use std::path::Path;
use tracing::info;

/// Installs the workflow at `workflow_path` and runs it with the trigger at
/// `trigger_path`.
///
/// # Errors
///
/// Returns a report whose context names the step that failed. A run whose
/// nodes fail is still `Ok`.
pub async fn run(
    config: &RunnerConfig,
    workflow_path: &Path,
    trigger_path: &Path,
) -> flowgate_core::Result<ExecutionResult, RunnerError> {
    let users = InMemoryUserRepository::with_admin(&config.admin.username, &config.admin.email);
    let admin = users
        .find_by_username(&config.admin.username)
        .await
        .ok_or_else(|| RunnerError::AdminMissing {
            username: config.admin.username.clone(),
        })?;
    let service = WorkflowService::new(InMemoryWorkflowRepository::new(), users);

    let definition = WorkflowDefinition::load(workflow_path)?;
    let trigger: Trigger = read_json(trigger_path)?;
    let workflow_id = definition.install(&service, admin.id()).await?;

    let result = service
        .execute_workflow(workflow_id, admin.id(), trigger)
        .await
        .context(RunnerError::Execution)?;

    info!(
        run_id = %result.run_id,
        state = ?result.state,
        final_message = %result.final_message,
        "run complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgate_workflow::{ExecutionState, NodeExecutionState};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const GREETING: &str = r#"{
        "name": "greeting",
        "nodes": [
            {"name": "start", "type": "INIT"},
            {"name": "is john", "type": "CONDITION", "depends_on": ["start"]},
            {"name": "greet", "type": "MODIFY_MESSAGE", "depends_on": ["is john"]},
            {"name": "keep", "type": "STORE_MESSAGE", "depends_on": ["greet"]}
        ]
    }"#;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[tokio::test]
    async fn runs_definition_end_to_end() {
        let workflow = write_temp(GREETING);
        let trigger = write_temp(r#"{"userId": "John", "message": "Hello"}"#);

        let result = run(&RunnerConfig::default(), workflow.path(), trigger.path())
            .await
            .expect("run");

        assert_eq!(result.state, ExecutionState::Completed);
        assert_eq!(result.final_message, "Hello Hello");
        assert_eq!(result.stored_messages().collect::<Vec<_>>(), vec!["Hello Hello"]);
    }

    #[tokio::test]
    async fn failed_condition_is_still_a_result() {
        let workflow = write_temp(GREETING);
        let trigger = write_temp(r#"{"userId": "Alice", "message": "Hello"}"#);

        let result = run(&RunnerConfig::default(), workflow.path(), trigger.path())
            .await
            .expect("run");

        assert_eq!(result.state, ExecutionState::Failed);
        let states: Vec<_> = result.outcomes.iter().map(|o| o.state).collect();
        assert_eq!(
            states,
            vec![
                NodeExecutionState::Succeeded,
                NodeExecutionState::Failed,
                NodeExecutionState::Skipped,
                NodeExecutionState::Skipped,
            ]
        );
    }

    #[tokio::test]
    async fn definition_without_init_fails_execution() {
        let workflow = write_temp(
            r#"{"name": "headless", "nodes": [{"name": "greet", "type": "MODIFY_MESSAGE"}]}"#,
        );
        let trigger = write_temp(r#"{"userId": "John", "message": "Hello"}"#);

        let err = run(&RunnerConfig::default(), workflow.path(), trigger.path())
            .await
            .expect_err("no init");
        assert_eq!(err.current_context(), &RunnerError::Execution);
    }

    #[tokio::test]
    async fn malformed_trigger_is_reported() {
        let workflow = write_temp(GREETING);
        let trigger = write_temp(r#"{"message": "missing user"}"#);

        let err = run(&RunnerConfig::default(), workflow.path(), trigger.path())
            .await
            .expect_err("bad trigger");
        assert!(matches!(err.current_context(), RunnerError::ParseFile { .. }));
    }
}
