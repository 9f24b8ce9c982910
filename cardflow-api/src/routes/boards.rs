/// Board lifecycle and outline endpoints
///
/// All endpoints require JWT authentication; authorization against the
/// board's membership is enforced by the service layer, not here.
///
/// # Endpoints
///
/// - `POST /v1/boards` - Create board (caller becomes owner)
/// - `GET /v1/boards` - Boards the caller is a member of
/// - `GET /v1/boards/:id` - Board outline (lists and tasks in order)
/// - `PATCH /v1/boards/:id` - Rename board (admin)
/// - `DELETE /v1/boards/:id` - Delete board (owner)

use crate::{
    app::{AppState, Caller},
    error::{validation_error, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use cardflow_shared::models::{board::Board, list::List, task::Task};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
}

/// Update board request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    /// New board title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
}

/// One list with its tasks, both in display order
#[derive(Debug, Serialize)]
pub struct OutlineList {
    /// The list itself
    #[serde(flatten)]
    pub list: List,

    /// The list's tasks, ordered by position
    pub tasks: Vec<Task>,
}

/// Board outline response
#[derive(Debug, Serialize)]
pub struct BoardOutlineResponse {
    /// The board's lists, ordered by position
    pub lists: Vec<OutlineList>,
}

/// Board index response
#[derive(Debug, Serialize)]
pub struct ListBoardsResponse {
    /// Boards the caller belongs to, newest first
    pub boards: Vec<Board>,
}

/// Create board
///
/// Creates a board owned by the caller. The owner membership row is
/// written in the same transaction as the board itself.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid JWT token
pub async fn create_board(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<Json<Board>> {
    req.validate().map_err(validation_error)?;

    let board = state.service.create_board(caller.user_id, &req.title).await?;
    Ok(Json(board))
}

/// List boards
///
/// Returns every board the caller holds a membership in, newest first.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<ListBoardsResponse>> {
    let boards = state.service.list_boards(caller.user_id).await?;
    Ok(Json(ListBoardsResponse { boards }))
}

/// Board outline
///
/// Returns the board's lists with their tasks, each ordered by
/// position. Requires membership.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is not a member (or the board is unknown)
pub async fn get_board_outline(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardOutlineResponse>> {
    let outline = state.service.board_outline(board_id, caller.user_id).await?;

    let lists = outline
        .into_iter()
        .map(|(list, tasks)| OutlineList { list, tasks })
        .collect();

    Ok(Json(BoardOutlineResponse { lists }))
}

/// Rename board
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is below `admin`
pub async fn update_board(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<Board>> {
    req.validate().map_err(validation_error)?;

    let board = state
        .service
        .update_board(board_id, caller.user_id, &req.title)
        .await?;
    Ok(Json(board))
}

/// Delete board
///
/// Deletes the board; its lists, tasks, and memberships cascade.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is not the owner
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    state.service.delete_board(board_id, caller.user_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
