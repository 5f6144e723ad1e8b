//! Fill a freshly created board with its randomized cells.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    dao::{lobby_store::UnitOfWork, models::CellEntity},
    services::lifecycle_service::LifecycleError,
    state::board::{CellColor, generate_layout},
};

/// Summary of a generated board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// Board that received the cells.
    pub board_id: Uuid,
    /// Number of cells written.
    pub cell_count: usize,
    /// Cells written per color.
    pub color_counts: IndexMap<CellColor, usize>,
}

/// Generate the cells of `board_id` inside `unit`.
///
/// The board must exist in the unit of work and must not have cells yet. All
/// cells are handed to the store in a single call and only become visible when
/// the caller commits.
pub async fn generate(
    unit: &mut dyn UnitOfWork,
    board_id: Uuid,
) -> Result<GenerationResult, LifecycleError> {
    let board = unit
        .find_board(board_id)
        .await?
        .ok_or(LifecycleError::BoardNotFound(board_id))?;
    if !board.cells.is_empty() {
        return Err(LifecycleError::BoardAlreadyGenerated(board_id));
    }

    let layout = generate_layout(&mut rand::rng());

    let mut color_counts: IndexMap<CellColor, usize> =
        CellColor::ALL.iter().map(|color| (*color, 0)).collect();
    let cells: Vec<CellEntity> = layout
        .into_iter()
        .map(|placement| {
            *color_counts.entry(placement.color).or_default() += 1;
            CellEntity {
                id: Uuid::new_v4(),
                row: placement.row,
                column: placement.column,
                color: placement.color,
                board_id,
            }
        })
        .collect();
    let cell_count = cells.len();

    unit.insert_cells(board_id, cells).await?;

    Ok(GenerationResult {
        board_id,
        cell_count,
        color_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::{
            lobby_store::{LobbyStore, MemoryLobbyStore},
            models::BoardEntity,
        },
        state::board::CELLS_PER_COLOR,
    };

    #[tokio::test]
    async fn fills_board_with_nine_cells_per_color() {
        let store = MemoryLobbyStore::new();
        let board = BoardEntity::empty();

        let mut unit = store.begin().await.unwrap();
        unit.insert_board(board.clone()).await.unwrap();
        let result = generate(unit.as_mut(), board.id).await.unwrap();

        assert_eq!(result.board_id, board.id);
        assert_eq!(result.cell_count, 36);
        assert!(
            result
                .color_counts
                .values()
                .all(|count| *count == CELLS_PER_COLOR)
        );
        assert!(store.find_board(board.id).await.unwrap().is_none());

        unit.commit().await.unwrap();
        let stored = store.find_board(board.id).await.unwrap().unwrap();
        assert_eq!(stored.cells.len(), 36);
        assert!(stored.cells.iter().all(|cell| cell.board_id == board.id));
    }

    #[tokio::test]
    async fn missing_board_is_reported() {
        let store = MemoryLobbyStore::new();
        let mut unit = store.begin().await.unwrap();
        let missing = Uuid::new_v4();

        let err = generate(unit.as_mut(), missing).await.unwrap_err();
        assert!(matches!(err, LifecycleError::BoardNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn board_is_generated_only_once() {
        let store = MemoryLobbyStore::new();
        let board = BoardEntity::empty();

        let mut unit = store.begin().await.unwrap();
        unit.insert_board(board.clone()).await.unwrap();
        generate(unit.as_mut(), board.id).await.unwrap();

        let err = generate(unit.as_mut(), board.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::BoardAlreadyGenerated(id) if id == board.id));
        assert_eq!(unit.find_board(board.id).await.unwrap().unwrap().cells.len(), 36);
    }
}
