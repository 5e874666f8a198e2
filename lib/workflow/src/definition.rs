//! Workflow definition types.
//!
//! A workflow is an owned, named collection of nodes together with:
//! - Metadata (name, description, enabled flag, timestamps)
//! - Run statistics, updated once per execution
//! - Attached content that execution never reads

use crate::content::Content;
use crate::error::GraphError;
use crate::graph::resolve;
use crate::node::{Node, NodeId, NodeSpec, NodeStatus, NodeType};
use chrono::{DateTime, Utc};
use flowgate_core::{UserId, WorkflowId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata for a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    /// Human-readable name for this workflow.
    pub name: String,
    /// Description of what this workflow does.
    pub description: Option<String>,
    /// Whether this workflow may be executed.
    pub enabled: bool,
    /// When this workflow was created.
    pub created_at: DateTime<Utc>,
    /// When this workflow was last updated.
    pub updated_at: DateTime<Utc>,
}

impl WorkflowMetadata {
    /// Creates enabled metadata with no description.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Aggregate run counters.
///
/// `run_count == success_count + failure_count` holds after every update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatistics {
    pub run_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub last_run_at: Option<DateTime<Utc>>,
}

impl WorkflowStatistics {
    /// Records one finished run.
    pub fn record(&mut self, succeeded: bool, at: DateTime<Utc>) {
        self.run_count += 1;
        if succeeded {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
        self.last_run_at = Some(at);
    }
}

/// Node totals and completion for a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowProgress {
    pub total_nodes: usize,
    /// Node count per status label.
    pub status_counts: BTreeMap<String, usize>,
    pub completed_nodes: usize,
    /// Share of nodes labelled `Completed`, in percent, rounded to 2 places.
    pub progress_percentage: f64,
    /// True when every node is `Completed` and there is at least one node.
    pub is_complete: bool,
    pub content_count: usize,
}

/// A workflow owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier for this workflow.
    pub id: WorkflowId,
    /// The user who created the workflow.
    pub owner: UserId,
    /// Workflow metadata.
    pub metadata: WorkflowMetadata,
    /// Nodes in creation order.
    nodes: Vec<Node>,
    /// Run counters.
    pub statistics: WorkflowStatistics,
    /// Attached content.
    contents: Vec<Content>,
    /// Raw value of the next id handed out by `create_node`.
    next_node_id: u32,
}

impl Workflow {
    /// Creates an empty workflow owned by `owner`.
    #[must_use]
    pub fn new(owner: UserId, name: impl Into<String>) -> Self {
        Self {
            id: WorkflowId::new(),
            owner,
            metadata: WorkflowMetadata::new(name),
            nodes: Vec::new(),
            statistics: WorkflowStatistics::default(),
            contents: Vec::new(),
            next_node_id: 1,
        }
    }

    /// Returns the workflow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Validates `spec` and adds it as a new node.
    ///
    /// The node gets the next sequential id. On error the workflow is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `UnknownNodeType` for an unknown type tag,
    /// `DanglingDependency` if a dependency is not in the workflow,
    /// `MultipleInitNodes` for a second INIT node, and `CycleDetected` if the
    /// existing graph cannot be ordered with the new node. Returns
    /// `IdSpaceExhausted` once no further id can be handed out.
    pub fn create_node(&mut self, spec: NodeSpec) -> Result<NodeId, GraphError> {
        let node_type: NodeType = spec.node_type.parse()?;
        let node_id = NodeId::new(self.next_node_id);
        let next_node_id = self
            .next_node_id
            .checked_add(1)
            .ok_or(GraphError::IdSpaceExhausted)?;

        if let Some(&dependency) = spec
            .dependencies
            .iter()
            .find(|&&dep| self.node(dep).is_none())
        {
            return Err(GraphError::DanglingDependency {
                node_id,
                dependency,
            });
        }

        if node_type.is_init() {
            let mut existing = self.init_nodes();
            if !existing.is_empty() {
                existing.push(node_id);
                return Err(GraphError::MultipleInitNodes { nodes: existing });
            }
        }

        let mut node = spec
            .dependencies
            .into_iter()
            .fold(Node::new(node_id, spec.name, node_type), Node::depends_on);
        node.description = spec.description;
        node.assigned_user = spec.assigned_user;
        node.metadata = spec.metadata;

        let mut candidate = self.nodes.clone();
        candidate.push(node);
        resolve(&candidate)?;

        self.nodes = candidate;
        self.next_node_id = next_node_id;
        self.touch();
        Ok(node_id)
    }

    /// Adds a pre-built node without validation.
    ///
    /// Used when restoring stored workflows; execution reports any
    /// structural problems afterwards.
    pub fn add_node(&mut self, node: Node) {
        self.next_node_id = self.next_node_id.max(node.id.get().saturating_add(1));
        self.nodes.push(node);
        self.touch();
    }

    /// Returns the node with `node_id`.
    #[must_use]
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    /// Returns the node with `node_id` mutably.
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    /// Returns all nodes in creation order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn init_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.node_type.is_init())
            .map(|n| n.id)
            .collect()
    }

    /// Returns the single INIT node.
    ///
    /// # Errors
    ///
    /// Returns `NoInitNode` or `MultipleInitNodes`.
    pub fn init_node(&self) -> Result<NodeId, GraphError> {
        match self.init_nodes().as_slice() {
            [] => Err(GraphError::NoInitNode),
            [only] => Ok(*only),
            many => Err(GraphError::MultipleInitNodes {
                nodes: many.to_vec(),
            }),
        }
    }

    /// Resolves the node execution order.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error if the graph cannot be ordered.
    pub fn execution_order(&self) -> Result<Vec<NodeId>, GraphError> {
        resolve(&self.nodes)
    }

    /// Replaces a node's status label.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the node is not in this workflow.
    pub fn set_node_status(
        &mut self,
        node_id: NodeId,
        status: NodeStatus,
    ) -> Result<(), GraphError> {
        let node = self
            .node_mut(node_id)
            .ok_or(GraphError::NodeNotFound { node_id })?;
        node.set_status(status);
        self.touch();
        Ok(())
    }

    /// Records one finished run in the statistics.
    pub fn record_run(&mut self, succeeded: bool, at: DateTime<Utc>) {
        self.statistics.record(succeeded, at);
    }

    /// Attaches content.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the content names a node not in this workflow.
    pub fn add_content(&mut self, content: Content) -> Result<(), GraphError> {
        if let Some(node_id) = content.node_id {
            if self.node(node_id).is_none() {
                return Err(GraphError::NodeNotFound { node_id });
            }
        }
        self.contents.push(content);
        self.touch();
        Ok(())
    }

    /// Returns attached content in insertion order.
    #[must_use]
    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    /// Summarizes node status labels.
    #[must_use]
    pub fn progress(&self) -> WorkflowProgress {
        let mut status_counts = BTreeMap::new();
        for node in &self.nodes {
            *status_counts
                .entry(node.status.as_str().to_string())
                .or_insert(0) += 1;
        }

        let total_nodes = self.nodes.len();
        let completed_nodes = self.nodes.iter().filter(|n| n.status.is_completed()).count();
        let progress_percentage = if total_nodes == 0 {
            0.0
        } else {
            let raw = completed_nodes as f64 * 100.0 / total_nodes as f64;
            (raw * 100.0).round() / 100.0
        };

        WorkflowProgress {
            total_nodes,
            status_counts,
            completed_nodes,
            progress_percentage,
            is_complete: total_nodes > 0 && completed_nodes == total_nodes,
            content_count: self.contents.len(),
        }
    }

    /// Returns whether the workflow is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.metadata.enabled
    }

    /// Enables the workflow.
    pub fn enable(&mut self) {
        self.metadata.enabled = true;
        self.touch();
    }

    /// Disables the workflow.
    pub fn disable(&mut self) {
        self.metadata.enabled = false;
        self.touch();
    }

    /// Marks the workflow as updated (bumps updated_at timestamp).
    pub fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}

/// Summary information about a workflow (for listings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: WorkflowId,
    pub owner: UserId,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub node_count: usize,
    pub run_count: u64,
    pub updated_at: DateTime<Utc>,
}

impl From<&Workflow> for WorkflowSummary {
    fn from(workflow: &Workflow) -> Self {
        Self {
            id: workflow.id,
            owner: workflow.owner,
            name: workflow.metadata.name.clone(),
            description: workflow.metadata.description.clone(),
            enabled: workflow.metadata.enabled,
            node_count: workflow.nodes.len(),
            run_count: workflow.statistics.run_count,
            updated_at: workflow.metadata.updated_at,
        }
    }
}
