use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the lobby service.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
        crate::routes::game::list_games,
        crate::routes::game::create_game,
        crate::routes::game::join_game,
        crate::routes::game::start_game,
        crate::routes::game::delete_game,
        crate::routes::player::list_players,
        crate::routes::player::create_player,
        crate::routes::board::list_boards,
        crate::routes::board::get_board,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ws::LobbyEvent,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::JoinGameRequest,
            crate::dto::game::GameCreatedResponse,
            crate::dto::game::JoinGameResponse,
            crate::dto::game::StartGameResponse,
            crate::dto::game::DeleteGameResponse,
            crate::dto::game::ColorCount,
            crate::dto::game::GameSummary,
            crate::dto::player::CreatePlayerRequest,
            crate::dto::player::PlayerSummary,
            crate::dto::board::BoardSummary,
            crate::dto::board::CellSummary,
            crate::state::board::CellColor,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Lobby lifecycle operations"),
        (name = "player", description = "Player registration"),
        (name = "board", description = "Generated boards"),
        (name = "notifications", description = "WebSocket notification stream"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/games",
            "/games/{id}/join",
            "/games/{id}/start",
            "/games/{id}",
            "/players",
            "/boards",
            "/boards/{id}",
            "/ws",
            "/healthcheck",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
