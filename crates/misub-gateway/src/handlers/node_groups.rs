//! Node group endpoints.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use misub_auth::SessionAuthority;
use misub_control::node_groups::ID_REQUIRED;
use misub_control::{AdminPlane, NodeGroup, NodeGroupInput};

use crate::auth::AdminSession;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::GatewayState;

/// Response carrying the node group collection.
#[derive(Debug, Serialize)]
pub struct NodeGroupsResponse {
    /// Always `true`.
    pub success: bool,
    /// What happened, for writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    /// The full collection.
    pub data: Vec<NodeGroup>,
}

/// Query parameters for deletion.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    /// Id of the group to delete.
    #[serde(default)]
    pub id: Option<String>,
}

/// List all node groups.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn list_node_groups<C, A>(
    State(state): State<Arc<GatewayState<C, A>>>,
    _session: AdminSession,
) -> Result<impl IntoResponse, ApiError>
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    let groups = state.control.list_node_groups().await?;

    Ok(Json(NodeGroupsResponse {
        success: true,
        message: None,
        data: groups,
    }))
}

/// Create a node group, or update one when the body names an id.
///
/// # Errors
///
/// Returns 400 for invalid input or a duplicate name, 404 for an unknown id,
/// and 409 if concurrent writers keep winning.
pub async fn upsert_node_group<C, A>(
    State(state): State<Arc<GatewayState<C, A>>>,
    session: AdminSession,
    ApiJson(input): ApiJson<NodeGroupInput>,
) -> Result<impl IntoResponse, ApiError>
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    tracing::debug!(session_id = %session.session_id, "Saving node group");
    let result = state.control.upsert_node_group(input).await?;

    Ok(Json(NodeGroupsResponse {
        success: true,
        message: Some(result.kind.message()),
        data: result.groups,
    }))
}

/// Delete the node group named by `?id=`.
///
/// # Errors
///
/// Returns 400 without an id and 404 if no group has it.
pub async fn delete_node_group<C, A>(
    State(state): State<Arc<GatewayState<C, A>>>,
    session: AdminSession,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    tracing::debug!(session_id = %session.session_id, "Deleting node group");
    let id = query
        .ok()
        .and_then(|Query(query)| query.id)
        .ok_or_else(|| ApiError::BadRequest(ID_REQUIRED.to_string()))?;

    let groups = state.control.delete_node_group(&id).await?;

    Ok(Json(NodeGroupsResponse {
        success: true,
        message: Some("node group deleted"),
        data: groups,
    }))
}
