//! Workflow node types.
//!
//! Nodes are the building blocks of workflows. Each node has:
//! - An id unique within its workflow
//! - A type that selects its processing behavior
//! - A set of dependency ids (nodes that must run before it)
//! - A free-form status label maintained by users

use crate::error::GraphError;
use chrono::{DateTime, Utc};
use flowgate_core::UserId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Identifier of a node within its workflow.
///
/// Ids are assigned in ascending order as nodes are added, and the resolver
/// uses that order to break ties between independent nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a node id from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// The processing behavior of a node.
///
/// Serialized as its upper-case tag. Tags outside the known set are kept as
/// `Unrecognized` so a stored workflow still loads; dispatching such a node
/// fails the run instead of passing the message through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    /// Entry point; passes the trigger message through.
    Init,
    /// Gate on the trigger's user id.
    Condition,
    /// Appends a fixed greeting to the message.
    ModifyMessage,
    /// Records the message into the run result.
    StoreMessage,
    /// A tag outside the known set.
    Unrecognized(String),
}

impl NodeType {
    /// Returns the wire tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Init => "INIT",
            Self::Condition => "CONDITION",
            Self::ModifyMessage => "MODIFY_MESSAGE",
            Self::StoreMessage => "STORE_MESSAGE",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Maps a tag to a type, keeping unknown tags as `Unrecognized`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "INIT" => Self::Init,
            "CONDITION" => Self::Condition,
            "MODIFY_MESSAGE" => Self::ModifyMessage,
            "STORE_MESSAGE" => Self::StoreMessage,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Returns true for the entry-point type.
    #[must_use]
    pub fn is_init(&self) -> bool {
        matches!(self, Self::Init)
    }
}

impl FromStr for NodeType {
    type Err = GraphError;

    /// Strict parse used when validating new nodes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_tag(s) {
            Self::Unrecognized(type_name) => Err(GraphError::UnknownNodeType { type_name }),
            known => Ok(known),
        }
    }
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        node_type.as_str().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form status label on a node.
///
/// The label is set by users and has no bearing on execution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeStatus(String);

impl NodeStatus {
    /// Label given to new nodes.
    pub const PENDING: &'static str = "Pending";
    /// Conventional label for work underway.
    pub const IN_PROGRESS: &'static str = "In Progress";
    /// Conventional label for finished work.
    pub const COMPLETED: &'static str = "Completed";
    /// Conventional label for rejected work.
    pub const REJECTED: &'static str = "Rejected";

    /// Creates a status with an arbitrary label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The `Pending` label.
    #[must_use]
    pub fn pending() -> Self {
        Self::new(Self::PENDING)
    }

    /// Returns the label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the label is `Completed`.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.0 == Self::COMPLETED
    }
}

impl Default for NodeStatus {
    fn default() -> Self {
        Self::pending()
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A processing step in a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Id unique within the owning workflow.
    pub id: NodeId,
    /// Human-readable name.
    pub name: String,
    /// The node's processing behavior.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Nodes that must execute before this one.
    #[serde(default)]
    pub dependencies: BTreeSet<NodeId>,
    /// User-maintained status label.
    #[serde(default)]
    pub status: NodeStatus,
    /// User responsible for this step, if any.
    #[serde(default)]
    pub assigned_user: Option<UserId>,
    /// Opaque metadata, never interpreted by execution.
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Creates a node with no dependencies and a `Pending` status.
    #[must_use]
    pub fn new(id: NodeId, name: impl Into<String>, node_type: NodeType) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            node_type,
            description: None,
            dependencies: BTreeSet::new(),
            status: NodeStatus::default(),
            assigned_user: None,
            metadata: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a dependency.
    #[must_use]
    pub fn depends_on(mut self, dependency: NodeId) -> Self {
        self.dependencies.insert(dependency);
        self
    }

    /// Replaces the status label.
    pub fn set_status(&mut self, status: NodeStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// Caller-supplied description of a node to create.
///
/// The type is carried as a raw tag and validated on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Human-readable name.
    pub name: String,
    /// Type tag, e.g. `"CONDITION"`.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Ids of existing nodes this node depends on.
    #[serde(default)]
    pub dependencies: Vec<NodeId>,
    /// User responsible for this step, if any.
    #[serde(default)]
    pub assigned_user: Option<UserId>,
    /// Opaque metadata.
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
}

impl NodeSpec {
    /// Creates a spec with the given name and type tag.
    #[must_use]
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.into(),
            description: None,
            dependencies: Vec::new(),
            assigned_user: None,
            metadata: Map::new(),
        }
    }

    /// Adds a dependency.
    #[must_use]
    pub fn depends_on(mut self, dependency: NodeId) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
