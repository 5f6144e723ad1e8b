use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    dto::{
        game::{
            CreateGameRequest, DeleteGameResponse, GameCreatedResponse, GameSummary,
            JoinGameResponse, StartGameResponse,
        },
        player::PlayerSummary,
    },
    error::ServiceError,
    state::SharedState,
};

/// List every game with the players currently attached to it.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameSummary>, ServiceError> {
    let store = state.require_lobby_store().await?;
    let games = store.list_games().await?;
    let players = store.list_players().await?;

    let mut by_game: HashMap<Uuid, Vec<PlayerSummary>> = HashMap::new();
    for player in players {
        if let Some(game_id) = player.game_id {
            by_game.entry(game_id).or_default().push(player.into());
        }
    }

    Ok(games
        .into_iter()
        .map(|game| {
            let players = by_game.remove(&game.id).unwrap_or_default();
            GameSummary::from_entity(game, players)
        })
        .collect())
}

/// Open a new lobby.
pub async fn create_game(
    state: &SharedState,
    payload: CreateGameRequest,
) -> Result<GameCreatedResponse, ServiceError> {
    let created = state
        .lifecycle()
        .await?
        .create(
            payload.name,
            payload.capacity,
            payload.private,
            payload.password,
        )
        .await?;
    Ok(created.into())
}

/// Attach `player_id` to `game_id`.
pub async fn join_game(
    state: &SharedState,
    game_id: Uuid,
    player_id: Uuid,
) -> Result<JoinGameResponse, ServiceError> {
    let ack = state.lifecycle().await?.join(game_id, player_id).await?;
    Ok(ack.into())
}

/// Start a game and generate its board.
pub async fn start_game(
    state: &SharedState,
    game_id: Uuid,
) -> Result<StartGameResponse, ServiceError> {
    let ack = state.lifecycle().await?.start(game_id).await?;
    Ok(ack.into())
}

/// Delete a game and everything it owns.
pub async fn delete_game(
    state: &SharedState,
    game_id: Uuid,
) -> Result<DeleteGameResponse, ServiceError> {
    let ack = state.lifecycle().await?.delete(game_id).await?;
    Ok(ack.into())
}
