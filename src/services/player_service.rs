use tracing::info;

use crate::{
    dao::models::PlayerEntity,
    dto::player::{CreatePlayerRequest, PlayerSummary},
    error::ServiceError,
    state::SharedState,
};

/// List every registered player.
pub async fn list_players(state: &SharedState) -> Result<Vec<PlayerSummary>, ServiceError> {
    let store = state.require_lobby_store().await?;
    let players = store.list_players().await?;
    Ok(players.into_iter().map(Into::into).collect())
}

/// Register a player that is not attached to any game.
pub async fn create_player(
    state: &SharedState,
    payload: CreatePlayerRequest,
) -> Result<PlayerSummary, ServiceError> {
    let store = state.require_lobby_store().await?;
    let player = PlayerEntity::new(payload.name);

    let mut unit = store.begin().await?;
    unit.insert_player(player.clone()).await?;
    unit.commit().await?;

    info!(player_id = %player.id, name = %player.name, "player registered");
    Ok(player.into())
}
