/// Board membership management endpoints
///
/// The owner role is fixed at board creation: it can never be assigned,
/// removed, or changed through these endpoints.
///
/// # Endpoints
///
/// - `GET /v1/boards/:id/members` - List members (member)
/// - `POST /v1/boards/:id/members` - Add member (owner)
/// - `PATCH /v1/boards/:id/members/:user_id` - Change role (owner)
/// - `DELETE /v1/boards/:id/members/:user_id` - Remove member (admin)

use crate::{
    app::{AppState, Caller},
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use cardflow_shared::models::membership::{BoardRole, Membership};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Add member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// The user to add
    pub user_id: Uuid,

    /// Their role; `owner` is rejected
    pub role: BoardRole,
}

/// Change member role request
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    /// The new role; `owner` is rejected
    pub role: BoardRole,
}

/// List members response
#[derive(Debug, Serialize)]
pub struct ListMembersResponse {
    /// Board memberships
    pub members: Vec<Membership>,
}

/// List members
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is not a member
pub async fn list_members(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<ListMembersResponse>> {
    let members = state.service.list_members(board_id, caller.user_id).await?;
    Ok(Json(ListMembersResponse { members }))
}

/// Add member
///
/// Adds a user to the board with the given role. Re-adding an existing
/// member is a conflict, not a role update.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is not the owner, or `role` is `owner`
/// - `404 Not Found`: Unknown user
/// - `409 Conflict`: User is already a member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<Membership>> {
    let membership = state
        .service
        .add_member(board_id, caller.user_id, req.user_id, req.role)
        .await?;
    Ok(Json(membership))
}

/// Change member role
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is not the owner, the target is the owner,
///   or the new role is `owner`
/// - `404 Not Found`: Target is not a member
pub async fn change_member_role(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((board_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ChangeRoleRequest>,
) -> ApiResult<Json<Membership>> {
    let membership = state
        .service
        .change_member_role(board_id, caller.user_id, user_id, req.role)
        .await?;
    Ok(Json(membership))
}

/// Remove member
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is below `admin`, or the target is the
///   owner
/// - `404 Not Found`: Target is not a member
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((board_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<axum::http::StatusCode> {
    state
        .service
        .remove_member(board_id, caller.user_id, user_id)
        .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
