use uuid::Uuid;

use crate::{dto::board::BoardSummary, error::ServiceError, state::SharedState};

/// List every board with its cells.
pub async fn list_boards(state: &SharedState) -> Result<Vec<BoardSummary>, ServiceError> {
    let store = state.require_lobby_store().await?;
    let boards = store.list_boards().await?;
    Ok(boards.into_iter().map(Into::into).collect())
}

/// Fetch a single board.
pub async fn get_board(state: &SharedState, id: Uuid) -> Result<BoardSummary, ServiceError> {
    let store = state.require_lobby_store().await?;
    store
        .find_board(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("board `{id}` not found")))
}
