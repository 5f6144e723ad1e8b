use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Configured storage backend ("memory" or "mongo").
    pub storage: String,
    /// Number of WebSocket clients currently connected.
    pub connections: usize,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(storage: &str, connections: usize) -> Self {
        Self {
            status: "ok".to_string(),
            storage: storage.to_string(),
            connections,
        }
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded(storage: &str, connections: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            storage: storage.to_string(),
            connections,
        }
    }
}
