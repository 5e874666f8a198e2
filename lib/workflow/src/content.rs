//! Content attached to a workflow.
//!
//! Tasks, notes and attachments are stored alongside a workflow but never
//! read by execution.

use crate::node::NodeId;
use chrono::{DateTime, Utc};
use flowgate_core::{ContentId, UserId, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Kind of attached content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// A unit of work.
    Task,
    /// A free-text note or comment.
    Note,
    /// A file reference.
    Attachment,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Task => "task",
            Self::Note => "note",
            Self::Attachment => "attachment",
        })
    }
}

/// A content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    pub content_type: ContentType,
    pub workflow_id: WorkflowId,
    /// The node this content is about, if any.
    pub node_id: Option<NodeId>,
    /// Opaque payload.
    pub data: JsonValue,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Content {
    /// Creates a content record with a fresh id.
    #[must_use]
    pub fn new(
        workflow_id: WorkflowId,
        content_type: ContentType,
        data: JsonValue,
        created_by: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ContentId::new(),
            content_type,
            workflow_id,
            node_id: None,
            data,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attaches the content to a node.
    #[must_use]
    pub fn for_node(mut self, node_id: NodeId) -> Self {
        self.node_id = Some(node_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_type_serializes_lowercase() {
        let json = serde_json::to_value(ContentType::Attachment).expect("serialize");
        assert_eq!(json, "attachment");
        assert_eq!(ContentType::Task.to_string(), "task");
    }

    #[test]
    fn node_scoped_content() {
        let content = Content::new(
            WorkflowId::new(),
            ContentType::Note,
            json!({"text": "check with finance"}),
            UserId::new(),
        )
        .for_node(NodeId::new(2));

        assert_eq!(content.node_id, Some(NodeId::new(2)));
        assert_eq!(content.data["text"], "check with finance");
    }
}
