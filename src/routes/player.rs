use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_valid::Valid;

use crate::{
    dto::player::{CreatePlayerRequest, PlayerSummary},
    error::AppError,
    services::player_service,
    state::SharedState,
};

/// Routes handling player registration.
pub fn router() -> Router<SharedState> {
    Router::new().route("/players", get(list_players).post(create_player))
}

/// List every registered player.
#[utoipa::path(
    get,
    path = "/players",
    tag = "player",
    responses((status = 200, description = "Players", body = [PlayerSummary]))
)]
pub async fn list_players(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    let players = player_service::list_players(&state).await?;
    Ok(Json(players))
}

/// Register a new player.
#[utoipa::path(
    post,
    path = "/players",
    tag = "player",
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player created", body = PlayerSummary),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_player(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreatePlayerRequest>>,
) -> Result<(StatusCode, Json<PlayerSummary>), AppError> {
    let player = player_service::create_player(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(player)))
}
