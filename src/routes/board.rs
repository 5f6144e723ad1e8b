use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::board::BoardSummary, error::AppError, services::board_service, state::SharedState,
};

/// Routes exposing generated boards.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/boards", get(list_boards))
        .route("/boards/{id}", get(get_board))
}

/// List every board with its cells.
#[utoipa::path(
    get,
    path = "/boards",
    tag = "board",
    responses((status = 200, description = "Boards", body = [BoardSummary]))
)]
pub async fn list_boards(
    State(state): State<SharedState>,
) -> Result<Json<Vec<BoardSummary>>, AppError> {
    let boards = board_service::list_boards(&state).await?;
    Ok(Json(boards))
}

/// Fetch one board.
#[utoipa::path(
    get,
    path = "/boards/{id}",
    tag = "board",
    params(("id" = Uuid, Path, description = "Identifier of the board")),
    responses(
        (status = 200, description = "Board", body = BoardSummary),
        (status = 404, description = "Board not found")
    )
)]
pub async fn get_board(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BoardSummary>, AppError> {
    let board = board_service::get_board(&state, id).await?;
    Ok(Json(board))
}
