use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::GameEntity,
    dto::{
        format_system_time,
        player::PlayerSummary,
        validation::{validate_capacity, validate_display_name},
    },
    services::{
        board_generator::GenerationResult,
        lifecycle_service::{CreatedGame, DeleteAck, JoinAck, StartAck},
    },
    state::board::CellColor,
};

/// Payload used to open a new lobby.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    /// Display name of the lobby.
    pub name: String,
    /// Declared number of players.
    pub capacity: u32,
    /// Whether the lobby is password protected.
    #[serde(default)]
    pub private: bool,
    /// Lobby password, empty for public lobbies.
    #[serde(default)]
    pub password: String,
}

impl Validate for CreateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_display_name(&self.name) {
            errors.add("name", e);
        }
        if let Err(e) = validate_capacity(self.capacity) {
            errors.add("capacity", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Payload used to attach a player to a lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinGameRequest {
    /// Player joining the lobby.
    pub player_id: Uuid,
}

/// Identifier and name of a created lobby.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameCreatedResponse {
    pub id: Uuid,
    pub name: String,
}

/// Acknowledgement of a join.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinGameResponse {
    pub game_id: Uuid,
    pub player_id: Uuid,
}

/// Number of cells of one color on a generated board.
#[derive(Debug, Serialize, ToSchema)]
pub struct ColorCount {
    pub color: CellColor,
    pub count: usize,
}

/// Acknowledgement of a start, with a summary of the generated board.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartGameResponse {
    pub game_id: Uuid,
    pub board_id: Uuid,
    pub cell_count: usize,
    pub colors: Vec<ColorCount>,
}

/// Acknowledgement of a deletion.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteGameResponse {
    pub game_id: Uuid,
    /// Board removed together with the game.
    pub board_id: Option<Uuid>,
    /// Players whose membership was cleared.
    pub detached_players: u64,
}

/// Lobby listing entry. The password is never exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSummary {
    pub id: Uuid,
    pub name: String,
    pub capacity: u32,
    pub started: bool,
    pub private: bool,
    pub board_id: Option<Uuid>,
    pub players: Vec<PlayerSummary>,
    pub created_at: String,
    pub updated_at: String,
}

impl GameSummary {
    /// Build a listing entry from a game row and the players attached to it.
    pub fn from_entity(game: GameEntity, players: Vec<PlayerSummary>) -> Self {
        Self {
            id: game.id,
            name: game.name,
            capacity: game.capacity,
            started: game.started,
            private: game.private,
            board_id: game.board_id,
            players,
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
        }
    }
}

impl From<CreatedGame> for GameCreatedResponse {
    fn from(value: CreatedGame) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<JoinAck> for JoinGameResponse {
    fn from(value: JoinAck) -> Self {
        Self {
            game_id: value.game_id,
            player_id: value.player_id,
        }
    }
}

impl From<StartAck> for StartGameResponse {
    fn from(value: StartAck) -> Self {
        let GenerationResult {
            board_id,
            cell_count,
            color_counts,
        } = value.board;
        Self {
            game_id: value.game_id,
            board_id,
            cell_count,
            colors: color_counts
                .into_iter()
                .map(|(color, count)| ColorCount { color, count })
                .collect(),
        }
    }
}

impl From<DeleteAck> for DeleteGameResponse {
    fn from(value: DeleteAck) -> Self {
        Self {
            game_id: value.game_id,
            board_id: value.board_id,
            detached_players: value.detached_players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_to_public() {
        let request: CreateGameRequest =
            serde_json::from_str(r#"{"name":"Lobby1","capacity":4}"#).unwrap();
        assert!(!request.private);
        assert!(request.password.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn create_request_reports_every_invalid_field() {
        let request = CreateGameRequest {
            name: "  ".into(),
            capacity: 0,
            private: false,
            password: String::new(),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("capacity"));
    }

    #[test]
    fn summary_hides_password() {
        let game = GameEntity::new("Secret".into(), 2, true, "hunter2".into());
        let json = serde_json::to_value(GameSummary::from_entity(game, Vec::new())).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["private"], true);
    }
}
