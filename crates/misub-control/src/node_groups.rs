//! Node group validation and in-memory mutation.
//!
//! Everything here works on a snapshot of the collection; persistence and
//! retries live in [`crate::service`]. Validation runs in a fixed order and
//! the first failure wins:
//!
//! 1. `name` is a string that is not blank after trimming
//! 2. `nodeIds` is a non-empty array of strings
//! 3. `description` / `enabled`, when present, have the right type
//! 4. on update, the id exists; then the trimmed name is unique among the
//!    other groups (on create, among all groups)

use chrono::{DateTime, Utc};
use misub_core::NodeGroupId;
use misub_store::NodeGroup;
use serde_json::Value;

use crate::error::{ControlError, Result};
use crate::types::{NodeGroupDraft, NodeGroupInput, UpsertKind};

/// Message for a missing or blank name.
pub const NAME_REQUIRED: &str = "group name is required";
/// Message for a missing, empty or malformed `nodeIds`.
pub const NODE_IDS_REQUIRED: &str = "nodeIds must be a non-empty array of strings";
/// Message for a missing group id on delete.
pub const ID_REQUIRED: &str = "group id is required";

/// Fields the server owns; clients cannot set them through `extra`.
const RESERVED_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

/// Check a raw request body and turn it into a draft.
///
/// # Errors
///
/// Returns `ControlError::Validation` for the first malformed field.
pub fn validate(input: NodeGroupInput) -> Result<NodeGroupDraft> {
    let name = match &input.name {
        Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
        _ => return Err(ControlError::Validation(NAME_REQUIRED.to_string())),
    };

    let node_ids = match input.node_ids {
        Some(Value::Array(items)) if !items.is_empty() => items
            .into_iter()
            .map(|item| match item {
                Value::String(id) => Ok(id),
                _ => Err(ControlError::Validation(NODE_IDS_REQUIRED.to_string())),
            })
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(ControlError::Validation(NODE_IDS_REQUIRED.to_string())),
    };

    let description = match input.description {
        None => None,
        Some(Value::String(text)) => Some(text),
        Some(_) => {
            return Err(ControlError::Validation(
                "description must be a string".to_string(),
            ))
        }
    };

    let enabled = match input.enabled {
        None => None,
        Some(Value::Bool(flag)) => Some(flag),
        Some(_) => {
            return Err(ControlError::Validation(
                "enabled must be a boolean".to_string(),
            ))
        }
    };

    let id = match input.id {
        None => None,
        Some(Value::String(raw)) if raw.trim().is_empty() => None,
        Some(Value::String(raw)) => Some(
            NodeGroupId::parse(raw.trim()).map_err(|e| ControlError::Validation(e.to_string()))?,
        ),
        Some(_) => {
            return Err(ControlError::Validation(
                "group id must be a string".to_string(),
            ))
        }
    };

    let mut extra = input.extra;
    for field in RESERVED_FIELDS {
        extra.remove(field);
    }

    Ok(NodeGroupDraft {
        id,
        name,
        description,
        node_ids,
        enabled,
        extra,
    })
}

/// Returns true if a group other than `except` already uses `name`.
#[must_use]
pub fn name_taken(groups: &[NodeGroup], name: &str, except: Option<&NodeGroupId>) -> bool {
    groups
        .iter()
        .filter(|group| !except.is_some_and(|id| group.id.matches(id.as_str())))
        .any(|group| group.name.trim() == name)
}

/// Index of the group addressed by `id`.
///
/// Stored ids are compared without surrounding whitespace, so records
/// written by older clients stay addressable.
fn position(groups: &[NodeGroup], id: &NodeGroupId) -> Option<usize> {
    groups.iter().position(|group| group.id.matches(id.as_str()))
}

/// Apply a validated draft to a snapshot.
///
/// Returns what happened and the index of the written group.
///
/// # Errors
///
/// Returns `ControlError::GroupNotFound` when updating an unknown id, or
/// `ControlError::DuplicateName` when the name is already used.
pub fn apply_upsert(
    groups: &mut Vec<NodeGroup>,
    draft: NodeGroupDraft,
    now: DateTime<Utc>,
) -> Result<(UpsertKind, usize)> {
    if let Some(id) = &draft.id {
        let index =
            position(groups, id).ok_or_else(|| ControlError::GroupNotFound(id.to_string()))?;

        if name_taken(groups, &draft.name, Some(id)) {
            return Err(ControlError::DuplicateName(draft.name));
        }

        let group = &mut groups[index];
        group.name = draft.name;
        group.node_ids = draft.node_ids;
        if let Some(description) = draft.description {
            group.description = description;
        }
        if let Some(enabled) = draft.enabled {
            group.enabled = enabled;
        }
        group.extra.extend(draft.extra);
        group.updated_at = now;

        return Ok((UpsertKind::Updated, index));
    }

    if name_taken(groups, &draft.name, None) {
        return Err(ControlError::DuplicateName(draft.name));
    }

    groups.push(NodeGroup {
        id: NodeGroupId::generate(),
        name: draft.name,
        description: draft.description.unwrap_or_default(),
        node_ids: draft.node_ids,
        enabled: draft.enabled.unwrap_or(true),
        created_at: now,
        updated_at: now,
        extra: draft.extra,
    });

    Ok((UpsertKind::Created, groups.len() - 1))
}

/// Remove the group with `id` from a snapshot.
///
/// # Errors
///
/// Returns `ControlError::GroupNotFound` if no group has that id.
pub fn apply_delete(groups: &mut Vec<NodeGroup>, id: &NodeGroupId) -> Result<NodeGroup> {
    let index = position(groups, id).ok_or_else(|| ControlError::GroupNotFound(id.to_string()))?;
    Ok(groups.remove(index))
}
