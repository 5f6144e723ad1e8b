use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::board::CellColor;

/// Game lobby row persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display name of the lobby.
    pub name: String,
    /// Number of players the creator declared for this game.
    pub capacity: u32,
    /// Whether the game has been started (monotonic while the game exists).
    pub started: bool,
    /// Whether the lobby is hidden behind a password.
    pub private: bool,
    /// Access password, empty for public lobbies.
    pub password: String,
    /// Board assigned when the game started.
    pub board_id: Option<Uuid>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the game row was updated.
    pub updated_at: SystemTime,
}

/// Registered player, optionally attached to a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Primary key of the player.
    pub id: Uuid,
    /// Display name chosen by the player.
    pub name: String,
    /// Whether the player currently sits in a game.
    pub in_game: bool,
    /// Whether the player is blocked from acting.
    pub blocked: bool,
    /// Whether it is the player's turn.
    pub turn: bool,
    /// Game the player joined, if any.
    pub game_id: Option<Uuid>,
}

/// Board created when a game starts. Owns its cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardEntity {
    /// Primary key of the board.
    pub id: Uuid,
    /// Optional primary color of the board.
    pub primary_color: Option<CellColor>,
    /// Cells of the board; empty until generated.
    pub cells: Vec<CellEntity>,
}

/// Single colored position on a board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellEntity {
    /// Primary key of the cell.
    pub id: Uuid,
    /// Row index (0..6).
    pub row: u8,
    /// Column index (0..6).
    pub column: u8,
    /// Color assigned at generation time.
    pub color: CellColor,
    /// Owning board.
    pub board_id: Uuid,
}

impl GameEntity {
    /// Build a fresh, not yet started game without a board.
    pub fn new(name: String, capacity: u32, private: bool, password: String) -> Self {
        let now = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            name,
            capacity,
            started: false,
            private,
            password,
            board_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl PlayerEntity {
    /// Build a fresh player that is not attached to any game.
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            in_game: false,
            blocked: false,
            turn: false,
            game_id: None,
        }
    }
}

impl BoardEntity {
    /// Build an empty board waiting for its cells.
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            primary_color: None,
            cells: Vec::new(),
        }
    }
}
