use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Notification pushed to every connected WebSocket client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LobbyEvent {
    /// A lobby was created.
    GameCreated {
        /// Identifier of the new game.
        game_id: Uuid,
        /// Display name of the new game.
        name: String,
    },
    /// A player joined a lobby.
    PlayerJoined {
        /// Game that was joined.
        game_id: Uuid,
        /// Player that joined.
        player_id: Uuid,
    },
    /// A game was started and its board generated.
    GameStarted {
        /// Game that started.
        game_id: Uuid,
        /// Board generated for the game.
        board_id: Uuid,
    },
    /// A game was deleted.
    GameDeleted {
        /// Game that was removed.
        game_id: Uuid,
    },
}

/// Text echoed to every client when one of them sends a text frame.
pub fn echo_text(text: &str) -> String {
    format!("Message text was: {text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_joined_wire_format() {
        let game_id = Uuid::nil();
        let player_id = Uuid::nil();
        let json = serde_json::to_value(LobbyEvent::PlayerJoined { game_id, player_id }).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "event": "player_joined",
                "game_id": "00000000-0000-0000-0000-000000000000",
                "player_id": "00000000-0000-0000-0000-000000000000",
            })
        );
    }

    #[test]
    fn echo_prefixes_the_payload() {
        assert_eq!(echo_text("hi"), "Message text was: hi");
    }
}
