/// Task creation and move endpoints
///
/// # Endpoints
///
/// - `POST /v1/lists/:id/tasks` - Create task (appended at the end)
/// - `POST /v1/tasks/:id/move` - Move task within or across lists
/// - `DELETE /v1/tasks/:id` - Delete task (positions compact)

use crate::{
    app::{AppState, Caller},
    error::{validation_error, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use cardflow_shared::models::task::{CreateTask, Task};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Optional due date
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,

    /// Optional assignee user id
    pub assignee_id: Option<Uuid>,
}

/// Move task request
#[derive(Debug, Deserialize)]
pub struct MoveTaskRequest {
    /// Destination list (the task's own list for a within-list move)
    pub dest_list_id: Uuid,

    /// Target index within the destination list. Out-of-range values
    /// clamp to the end.
    pub target_index: usize,
}

/// Create task
///
/// Appends a new task at the end of the list. Requires membership of
/// the list's board.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is not a member
/// - `404 Not Found`: Unknown list
pub async fn create_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(list_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(validation_error)?;

    let task = state
        .service
        .create_task(
            list_id,
            caller.user_id,
            CreateTask {
                title: req.title,
                description: req.description,
                due_date: req.due_date,
                assignee_id: req.assignee_id,
            },
        )
        .await?;
    Ok(Json(task))
}

/// Move task
///
/// Repositions the task within its list, or transfers it to another
/// list at the given index. Both sibling sets stay dense; cross-board
/// moves require membership of both boards.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller lacks membership of a involved board
/// - `404 Not Found`: Unknown task or destination list
/// - `409 Conflict`: Persistent contention, the client should retry
pub async fn move_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<MoveTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = state
        .service
        .move_task(task_id, caller.user_id, req.dest_list_id, req.target_index)
        .await?;
    Ok(Json(task))
}

/// Delete task
///
/// Deletes the task; the list's remaining positions compact to stay
/// dense.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Caller is not a member
/// - `404 Not Found`: Unknown task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    state.service.delete_task(task_id, caller.user_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
