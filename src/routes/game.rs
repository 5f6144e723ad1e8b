use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::game::{
        CreateGameRequest, DeleteGameResponse, GameCreatedResponse, GameSummary,
        JoinGameRequest, JoinGameResponse, StartGameResponse,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling lobby listing and lifecycle operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}/join", put(join_game))
        .route("/games/{id}/start", put(start_game))
        .route("/games/{id}", delete(delete_game))
}

/// List every lobby with its joined players.
#[utoipa::path(
    get,
    path = "/games",
    tag = "game",
    responses(
        (status = 200, description = "Lobbies", body = [GameSummary]),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameSummary>>, AppError> {
    let games = game_service::list_games(&state).await?;
    Ok(Json(games))
}

/// Open a new lobby.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameCreatedResponse),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<(StatusCode, Json<GameCreatedResponse>), AppError> {
    let created = game_service::create_game(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Attach a player to a lobby.
#[utoipa::path(
    put,
    path = "/games/{id}/join",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game to join")),
    request_body = JoinGameRequest,
    responses(
        (status = 200, description = "Player joined", body = JoinGameResponse),
        (status = 404, description = "Game or player not found")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<JoinGameRequest>>,
) -> Result<Json<JoinGameResponse>, AppError> {
    let ack = game_service::join_game(&state, id, payload.player_id).await?;
    Ok(Json(ack))
}

/// Start a lobby and generate its board.
#[utoipa::path(
    put,
    path = "/games/{id}/start",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game to start")),
    responses(
        (status = 200, description = "Game started", body = StartGameResponse),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Game already started")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StartGameResponse>, AppError> {
    let ack = game_service::start_game(&state, id).await?;
    Ok(Json(ack))
}

/// Delete a lobby, its board, and detach its players.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game to delete")),
    responses(
        (status = 200, description = "Game deleted", body = DeleteGameResponse),
        (status = 404, description = "Game not found")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteGameResponse>, AppError> {
    let ack = game_service::delete_game(&state, id).await?;
    Ok(Json(ack))
}
