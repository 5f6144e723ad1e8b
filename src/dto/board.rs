use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{BoardEntity, CellEntity},
    state::board::CellColor,
};

/// Board with its cells sorted row-major.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardSummary {
    pub id: Uuid,
    pub primary_color: Option<CellColor>,
    pub cells: Vec<CellSummary>,
}

/// One colored cell of a board.
#[derive(Debug, Serialize, ToSchema)]
pub struct CellSummary {
    pub id: Uuid,
    pub row: u8,
    pub column: u8,
    pub color: CellColor,
}

impl From<BoardEntity> for BoardSummary {
    fn from(value: BoardEntity) -> Self {
        let mut cells: Vec<CellSummary> = value.cells.into_iter().map(Into::into).collect();
        cells.sort_by_key(|cell| (cell.row, cell.column));
        Self {
            id: value.id,
            primary_color: value.primary_color,
            cells,
        }
    }
}

impl From<CellEntity> for CellSummary {
    fn from(value: CellEntity) -> Self {
        Self {
            id: value.id,
            row: value.row,
            column: value.column,
            color: value.color,
        }
    }
}
