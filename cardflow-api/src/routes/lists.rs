/// List creation and reordering endpoints
///
/// # Endpoints
///
/// - `POST /v1/boards/:id/lists` - Create list (appended at the end)
/// - `POST /v1/lists/:id/move` - Reorder list within its board
/// - `DELETE /v1/lists/:id` - Delete list (positions compact)

use crate::{
    app::{AppState, Caller},
    error::{validation_error, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use cardflow_shared::models::list::List;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create list request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListRequest {
    /// List title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
}

/// Move list request
#[derive(Debug, Deserialize)]
pub struct MoveListRequest {
    /// The board the list belongs to
    pub board_id: Uuid,

    /// Target index within the board's lists. Out-of-range values clamp
    /// to the end.
    pub target_index: usize,
}

/// Create list
///
/// Appends a new list at the end of the board. Requires membership.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is not a member
pub async fn create_list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<CreateListRequest>,
) -> ApiResult<Json<List>> {
    req.validate().map_err(validation_error)?;

    let list = state
        .service
        .create_list(board_id, caller.user_id, &req.title)
        .await?;
    Ok(Json(list))
}

/// Move list
///
/// Repositions the list within its board; sibling positions stay dense.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is not a member
/// - `404 Not Found`: List does not belong to the given board
/// - `409 Conflict`: Persistent contention, the client should retry
pub async fn move_list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<MoveListRequest>,
) -> ApiResult<Json<List>> {
    let list = state
        .service
        .move_list(list_id, caller.user_id, req.board_id, req.target_index)
        .await?;
    Ok(Json(list))
}

/// Delete list
///
/// Deletes the list and its tasks; the board's remaining list positions
/// compact to stay dense.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is not a member
/// - `404 Not Found`: Unknown list
pub async fn delete_list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(list_id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    state.service.delete_list(list_id, caller.user_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
