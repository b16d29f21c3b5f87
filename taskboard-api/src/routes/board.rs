/// Whole-board snapshot
///
/// ```text
/// GET /board
/// ```
///
/// Returns the columns in board order, every task with its assignee
/// resolved, and the user roster, so a client can render the board from a
/// single request.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use taskboard_shared::service::Board;

pub async fn get_board(State(state): State<AppState>) -> ApiResult<Json<Board>> {
    Ok(Json(state.board.board().await?))
}
