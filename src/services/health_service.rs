use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report degraded mode, the storage backend and the number of live connections,
/// logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_lobby_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    let storage = state.config().storage.backend();
    let connections = state.hub().len();
    if state.is_degraded().await {
        HealthResponse::degraded(storage, connections)
    } else {
        HealthResponse::ok(storage, connections)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;
    use crate::{config::AppConfig, dao::lobby_store::MemoryLobbyStore, state::AppState};

    #[tokio::test]
    async fn degraded_without_a_store() {
        let state = AppState::new(AppConfig::default());

        let health = health_status(&state).await;

        assert_eq!(health.status, "degraded");
        assert_eq!(health.storage, "memory");
        assert_eq!(health.connections, 0);
    }

    #[tokio::test]
    async fn ok_once_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        state.set_lobby_store(Arc::new(MemoryLobbyStore::new())).await;
        let (tx, _rx) = mpsc::unbounded_channel();
        state.hub().connect(tx);

        let health = health_status(&state).await;

        assert_eq!(health.status, "ok");
        assert_eq!(health.connections, 1);
    }

    #[tokio::test]
    async fn degraded_again_after_the_store_is_cleared() {
        let state = AppState::new(AppConfig::default());
        state.set_lobby_store(Arc::new(MemoryLobbyStore::new())).await;
        state.clear_lobby_store().await;

        assert_eq!(health_status(&state).await.status, "degraded");
    }
}
