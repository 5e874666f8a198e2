//! JSON workflow definitions.
//!
//! A definition lists nodes in order and refers to dependencies by node name:
//!
//! ```json
//! {
//!   "name": "greeting",
//!   "nodes": [
//!     { "name": "start", "type": "INIT" },
//!     { "name": "is john", "type": "CONDITION", "depends_on": ["start"] },
//!     { "name": "greet", "type": "MODIFY_MESSAGE", "depends_on": ["is john"] }
//!   ]
//! }
//! ```
//!
//! A dependency must be defined earlier in the list.

use crate::error::RunnerError;
use flowgate_core::{UserId, WorkflowId};
use flowgate_engine::{UserRepository, WorkflowRepository, WorkflowService};
use flowgate_workflow::{NodeId, NodeSpec};
use rootcause::prelude::{Report, ResultExt};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// A workflow as written in a definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub nodes: Vec<NodeDefinition>,
}

/// One node in a definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeDefinition {
    /// Unique within the definition; used by `depends_on`.
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Names of nodes defined earlier.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
}

/// Reads and deserializes a JSON file.
///
/// # Errors
///
/// Returns `ReadFile` or `ParseFile` with the underlying cause attached.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Report<RunnerError>> {
    let text = std::fs::read_to_string(path).context(RunnerError::ReadFile {
        path: path.to_path_buf(),
    })?;
    serde_json::from_str(&text).context(RunnerError::ParseFile {
        path: path.to_path_buf(),
    })
}

impl WorkflowDefinition {
    /// Loads a definition file.
    ///
    /// # Errors
    ///
    /// See [`read_json`].
    pub fn load(path: &Path) -> Result<Self, Report<RunnerError>> {
        let definition: Self = read_json(path)?;
        debug!(path = %path.display(), nodes = definition.nodes.len(), "loaded workflow definition");
        Ok(definition)
    }

    /// Creates the workflow and its nodes through `service`, owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateNodeName` or `UnknownDependency` for a malformed
    /// definition, and `Install` when the service rejects a node.
    pub async fn install<W, U>(
        &self,
        service: &WorkflowService<W, U>,
        owner: UserId,
    ) -> Result<WorkflowId, Report<RunnerError>>
    where
        W: WorkflowRepository,
        U: UserRepository,
    {
        let workflow = service
            .create_workflow(owner, &self.name, self.description.clone())
            .await
            .context(RunnerError::Install)?;

        let mut ids: HashMap<&str, NodeId> = HashMap::new();
        for node in &self.nodes {
            if ids.contains_key(node.name.as_str()) {
                return Err(RunnerError::DuplicateNodeName {
                    name: node.name.clone(),
                }
                .into());
            }

            let mut spec = NodeSpec::new(&node.name, &node.node_type);
            if let Some(description) = &node.description {
                spec = spec.with_description(description);
            }
            spec.metadata = node.metadata.clone();
            for dependency in &node.depends_on {
                let &id = ids.get(dependency.as_str()).ok_or_else(|| {
                    RunnerError::UnknownDependency {
                        node: node.name.clone(),
                        dependency: dependency.clone(),
                    }
                })?;
                spec = spec.depends_on(id);
            }

            let node_id = service
                .create_node(workflow.id, owner, spec)
                .await
                .context(RunnerError::Install)?;
            ids.insert(node.name.as_str(), node_id);
        }

        info!(workflow_id = %workflow.id, nodes = ids.len(), "installed workflow");
        Ok(workflow.id)
    }
}
