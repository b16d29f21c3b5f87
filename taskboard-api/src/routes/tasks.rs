/// Task endpoints
///
/// - `GET /tasks` - All tasks with assignees, by order
/// - `POST /tasks` - Create (201); the column follows the status
/// - `GET /tasks/:id` - One task
/// - `PUT /tasks/:id` - Dialog edit (title, description, status, assignee)
/// - `DELETE /tasks/:id` - Delete
/// - `PUT /tasks/:id/status` - Drag and drop move
/// - `PUT /tasks/:id/assignee` - Assign or unassign
///
/// Writes accept an optional `version`; a stale one is answered with `409`.
/// Any `columnId` in a request body is ignored.

use crate::{
    app::AppState,
    error::{parse_id, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use taskboard_shared::models::task::{
    AssignTaskInput, CreateTaskInput, MoveTaskInput, TaskDetails, UpdateTaskInput,
};

pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskDetails>>> {
    Ok(Json(state.board.tasks().await?))
}

/// Create a task
///
/// ```text
/// POST /tasks
/// Content-Type: application/json
///
/// { "title": "Design Homepage", "status": "todo", "assigneeId": 9 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: empty title, unknown assignee
/// - `500 Internal Server Error`: the status column does not exist
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskDetails>)> {
    let Json(input) = payload?;
    let task = state.board.create_task(input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskDetails>> {
    let id = parse_id(&id, "task")?;
    Ok(Json(state.board.task(id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskInput>, JsonRejection>,
) -> ApiResult<Json<TaskDetails>> {
    let id = parse_id(&id, "task")?;
    let Json(input) = payload?;
    Ok(Json(state.board.update_task(id, input).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "task")?;
    state.board.delete_task(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Move a task to another status
///
/// ```text
/// PUT /tasks/5/status
/// Content-Type: application/json
///
/// { "status": "in-progress", "version": 3 }
/// ```
///
/// The task lands at the end of the matching column. Moving to the current
/// status returns the task unchanged.
pub async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MoveTaskInput>, JsonRejection>,
) -> ApiResult<Json<TaskDetails>> {
    let id = parse_id(&id, "task")?;
    let Json(input) = payload?;
    Ok(Json(state.board.move_task(id, input).await?))
}

/// Set or clear the assignee (`{"assigneeId": null}` unassigns)
pub async fn assign_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AssignTaskInput>, JsonRejection>,
) -> ApiResult<Json<TaskDetails>> {
    let id = parse_id(&id, "task")?;
    let Json(input) = payload?;
    Ok(Json(state.board.assign_task(id, input).await?))
}
