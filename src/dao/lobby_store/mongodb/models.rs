use mongodb::bson::{self, DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dao::models::{BoardEntity, CellEntity, GameEntity, PlayerEntity},
    state::board::CellColor,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    capacity: u32,
    started: bool,
    private: bool,
    password: String,
    board_id: Option<bson::Uuid>,
    created_at: DateTime,
    updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    in_game: bool,
    blocked: bool,
    turn: bool,
    game_id: Option<bson::Uuid>,
}

/// Boards embed their cells so a generated layout is written in one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoBoardDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    primary_color: Option<CellColor>,
    #[serde(default)]
    cells: Vec<MongoCellDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MongoCellDocument {
    id: bson::Uuid,
    row: u8,
    column: u8,
    color: CellColor,
    board_id: bson::Uuid,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: to_bson_uuid(value.id),
            name: value.name,
            capacity: value.capacity,
            started: value.started,
            private: value.private,
            password: value.password,
            board_id: value.board_id.map(to_bson_uuid),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: from_bson_uuid(value.id),
            name: value.name,
            capacity: value.capacity,
            started: value.started,
            private: value.private,
            password: value.password,
            board_id: value.board_id.map(from_bson_uuid),
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

impl From<PlayerEntity> for MongoPlayerDocument {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: to_bson_uuid(value.id),
            name: value.name,
            in_game: value.in_game,
            blocked: value.blocked,
            turn: value.turn,
            game_id: value.game_id.map(to_bson_uuid),
        }
    }
}

impl From<MongoPlayerDocument> for PlayerEntity {
    fn from(value: MongoPlayerDocument) -> Self {
        Self {
            id: from_bson_uuid(value.id),
            name: value.name,
            in_game: value.in_game,
            blocked: value.blocked,
            turn: value.turn,
            game_id: value.game_id.map(from_bson_uuid),
        }
    }
}

impl From<CellEntity> for MongoCellDocument {
    fn from(value: CellEntity) -> Self {
        Self {
            id: to_bson_uuid(value.id),
            row: value.row,
            column: value.column,
            color: value.color,
            board_id: to_bson_uuid(value.board_id),
        }
    }
}

impl From<MongoCellDocument> for CellEntity {
    fn from(value: MongoCellDocument) -> Self {
        Self {
            id: from_bson_uuid(value.id),
            row: value.row,
            column: value.column,
            color: value.color,
            board_id: from_bson_uuid(value.board_id),
        }
    }
}

impl From<BoardEntity> for MongoBoardDocument {
    fn from(value: BoardEntity) -> Self {
        Self {
            id: to_bson_uuid(value.id),
            primary_color: value.primary_color,
            cells: value.cells.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<MongoBoardDocument> for BoardEntity {
    fn from(value: MongoBoardDocument) -> Self {
        Self {
            id: from_bson_uuid(value.id),
            primary_color: value.primary_color,
            cells: value.cells.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn to_bson_uuid(id: Uuid) -> bson::Uuid {
    bson::Uuid::from_bytes(id.into_bytes())
}

fn from_bson_uuid(id: bson::Uuid) -> Uuid {
    Uuid::from_bytes(id.bytes())
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": to_bson_uuid(id)}
}
