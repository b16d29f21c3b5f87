/// User endpoints
///
/// - `GET /users` - All users, name descending
/// - `POST /users` - Create (201)
/// - `GET /users/task-counts` - `{ "<userId>": count }` for every user
/// - `GET /users/:id` - One user
/// - `PUT /users/:id` - Update; omitting `avatar` keeps the current one
/// - `DELETE /users/:id` - Delete, refused with `409` while tasks are assigned
/// - `GET /users/:id/tasks` - Assigned tasks by status then title
///
/// # Delete refusal body
///
/// ```json
/// {
///   "error": "Cannot delete this user as they have 1 task assigned.",
///   "hasAssignedTasks": true,
///   "taskCount": 1
/// }
/// ```

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
use std::collections::BTreeMap;
use taskboard_shared::models::task::TaskDetails;
use taskboard_shared::models::user::{CreateUser, UpdateUser, User};

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.board.users().await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(input) = payload?;
    let user = state.board.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn task_counts(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<i32, i64>>> {
    Ok(Json(state.board.user_task_counts().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id, "user")?;
    Ok(Json(state.board.user(id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id, "user")?;
    let Json(input) = payload?;
    Ok(Json(state.board.update_user(id, input).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "user")?;
    state.board.delete_user(id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn user_tasks(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<TaskDetails>>> {
    let id = parse_id(&id, "user")?;
    Ok(Json(state.board.user_tasks(id).await?))
}
