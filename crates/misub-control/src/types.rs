//! Request and response types for control plane operations.

use misub_core::NodeGroupId;
use misub_store::NodeGroup;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Everything the dashboard loads on start-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    /// Subscription records, `[]` when never saved.
    pub misubs: Value,
    /// Profile records, `[]` when never saved.
    pub profiles: Value,
    /// Worker settings, `{}` when never saved.
    pub config: Value,
}

/// Body of a subscription data save.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveMisubsRequest {
    /// Replacement subscription records.
    #[serde(default)]
    pub misubs: Option<Value>,
    /// Replacement profile records.
    #[serde(default)]
    pub profiles: Option<Value>,
}

/// Raw body of a node group create/update.
///
/// Fields are kept loosely typed so shape problems surface as validation
/// errors in a fixed order instead of parse failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupInput {
    /// Id of the group to update; absent, null or empty means create.
    #[serde(default)]
    pub id: Option<Value>,
    /// Group name.
    #[serde(default)]
    pub name: Option<Value>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<Value>,
    /// Referenced node ids.
    #[serde(default)]
    pub node_ids: Option<Value>,
    /// Optional enabled flag.
    #[serde(default)]
    pub enabled: Option<Value>,
    /// Any other fields the client sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A validated node group write.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGroupDraft {
    /// Target of an update, `None` for a create.
    pub id: Option<NodeGroupId>,
    /// Trimmed, non-empty name.
    pub name: String,
    /// New description, if one was submitted.
    pub description: Option<String>,
    /// Non-empty node id list.
    pub node_ids: Vec<String>,
    /// New enabled flag, if one was submitted.
    pub enabled: Option<bool>,
    /// Extra client fields to merge onto the record.
    pub extra: Map<String, Value>,
}

/// Whether an upsert created or updated a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertKind {
    /// A new group was appended.
    Created,
    /// An existing group was modified in place.
    Updated,
}

impl UpsertKind {
    /// Human-readable success message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Created => "node group created",
            Self::Updated => "node group updated",
        }
    }
}

/// Result of a successful node group upsert.
#[derive(Debug, Clone)]
pub struct UpsertResult {
    /// What happened.
    pub kind: UpsertKind,
    /// The group as written.
    pub group: NodeGroup,
    /// The full collection after the write.
    pub groups: Vec<NodeGroup>,
}

/// Configuration for the control plane service.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// How many read-modify-write cycles a node group mutation may take
    /// before giving up on concurrent writers.
    pub max_write_attempts: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_accepts_camel_case_and_extras() {
        let input: NodeGroupInput = serde_json::from_value(json!({
            "name": "HK",
            "nodeIds": ["a"],
            "color": "blue"
        }))
        .unwrap();
        assert_eq!(input.name, Some(json!("HK")));
        assert_eq!(input.node_ids, Some(json!(["a"])));
        assert!(input.id.is_none());
        assert_eq!(input.extra.get("color"), Some(&json!("blue")));
    }

    #[test]
    fn input_tolerates_wrong_types() {
        let input: NodeGroupInput =
            serde_json::from_value(json!({ "name": 42, "nodeIds": "a,b" })).unwrap();
        assert_eq!(input.name, Some(json!(42)));
        assert_eq!(input.node_ids, Some(json!("a,b")));
    }

    #[test]
    fn upsert_messages_differ() {
        assert_ne!(UpsertKind::Created.message(), UpsertKind::Updated.message());
    }

    #[test]
    fn control_config_defaults() {
        assert_eq!(ControlConfig::default().max_write_attempts, 5);
    }
}
