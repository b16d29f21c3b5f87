/// Column endpoints
///
/// The three status columns are created at startup; `POST /columns` exists
/// for administration. Columns whose names are not status labels hold no
/// tasks, since every task is placed by its status.
///
/// - `GET /columns` - Columns by board order
/// - `POST /columns` - Create a column (201)

use crate::{app::AppState, error::ApiResult};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use taskboard_shared::models::column::{Column, CreateColumn};

pub async fn list_columns(State(state): State<AppState>) -> ApiResult<Json<Vec<Column>>> {
    Ok(Json(state.board.columns().await?))
}

pub async fn create_column(
    State(state): State<AppState>,
    payload: Result<Json<CreateColumn>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Column>)> {
    let Json(input) = payload?;
    let column = state.board.create_column(input).await?;
    Ok((StatusCode::CREATED, Json(column)))
}
