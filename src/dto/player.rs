use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{dao::models::PlayerEntity, dto::validation::validate_display_name};

/// Payload used to register a player.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlayerRequest {
    /// Display name of the player.
    pub name: String,
}

impl Validate for CreatePlayerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_display_name(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
/// Public view of a registered player.
pub struct PlayerSummary {
    pub id: Uuid,
    pub name: String,
    pub in_game: bool,
    pub blocked: bool,
    pub turn: bool,
    pub game_id: Option<Uuid>,
}

impl From<PlayerEntity> for PlayerSummary {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            in_game: value.in_game,
            blocked: value.blocked,
            turn: value.turn,
            game_id: value.game_id,
        }
    }
}
