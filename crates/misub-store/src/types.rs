//! Domain types stored in the database.

use chrono::{DateTime, Utc};
use misub_core::NodeGroupId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named, user-defined collection of subscription node references.
///
/// The whole collection of groups is stored as one JSON array under
/// [`crate::keys::NODE_GROUPS`]. `node_ids` are weak references into the
/// subscription data; nothing checks that they resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroup {
    /// Unique identifier.
    pub id: NodeGroupId,
    /// Display name, trimmed and unique across the collection.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Referenced node ids, in submission order. Never empty once validated.
    #[serde(default)]
    pub node_ids: Vec<String>,
    /// Whether the group is active.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Fields written by the front-end that the server does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const fn default_enabled() -> bool {
    true
}
