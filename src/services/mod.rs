/// Randomized cell generation for started games.
pub mod board_generator;
/// Read access to generated boards.
pub mod board_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game listing and lifecycle entry points used by the routes.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Game lifecycle transitions and their notifications.
pub mod lifecycle_service;
/// Player registration and listing.
pub mod player_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// WebSocket connection and message handling service.
pub mod websocket_service;
