//! Trigger input for a single run.
//!
//! A trigger is ephemeral: it seeds one execution and is echoed back in the
//! run result, but it is never stored on the workflow.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// What caused the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerType {
    /// A user sent a message.
    #[default]
    UserMessage,
    /// Manual trigger (user-initiated).
    Manual,
    /// HTTP webhook trigger.
    Webhook,
    /// Time-based trigger.
    Schedule,
}

/// Input to one workflow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Identifier of whoever sent the message. Compared by CONDITION nodes.
    #[serde(alias = "userId")]
    pub user_id: String,
    /// The kind of trigger.
    #[serde(rename = "type", default)]
    pub trigger_type: TriggerType,
    /// Initial message payload.
    pub message: String,
    /// Open key-value bag, never interpreted by execution.
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
}

impl Trigger {
    /// Creates a user-message trigger.
    #[must_use]
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            trigger_type: TriggerType::default(),
            message: message.into(),
            metadata: Map::new(),
        }
    }

    /// Sets the trigger type.
    #[must_use]
    pub fn with_type(mut self, trigger_type: TriggerType) -> Self {
        self.trigger_type = trigger_type;
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
