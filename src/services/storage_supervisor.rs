use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{lobby_store::LobbyStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect the storage backend, install it into the shared state and keep it healthy.
///
/// The state stays in degraded mode while no healthy store is installed.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn LobbyStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.set_lobby_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                watch_store(&state, store.as_ref()).await;

                warn!("exhausted storage reconnect attempts; dropping the store");
                state.clear_lobby_store().await;
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
            }
        }

        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// Poll the installed store until it fails and cannot be reconnected.
async fn watch_store(state: &SharedState, store: &dyn LobbyStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded().await {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false).await;
                }
                sleep(HEALTH_POLL_INTERVAL).await;
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed; entering degraded mode");
                state.update_degraded(true).await;

                if !reconnect(store).await {
                    return;
                }
                state.update_degraded(false).await;
                sleep(HEALTH_POLL_INTERVAL).await;
            }
        }
    }
}

async fn reconnect(store: &dyn LobbyStore) -> bool {
    let mut delay = INITIAL_DELAY;

    for attempt in 1..=MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded");
                return true;
            }
            Err(err) => {
                warn!(attempt, error = %err, "storage reconnect attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, dao::lobby_store::MemoryLobbyStore, state::AppState};

    #[tokio::test]
    async fn installing_a_store_leaves_degraded_mode() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded().await);
        let mut watcher = state.degraded_watcher();

        let task = tokio::spawn(run(state.clone(), || async {
            let store: Arc<dyn LobbyStore> = Arc::new(MemoryLobbyStore::new());
            Ok::<_, StorageError>(store)
        }));

        tokio::time::timeout(Duration::from_secs(1), watcher.wait_for(|degraded| !degraded))
            .await
            .expect("degraded flag cleared")
            .unwrap();
        assert!(state.lobby_store().await.is_some());
        assert!(!state.is_degraded().await);

        task.abort();
    }

    #[tokio::test]
    async fn healthy_store_reconnects_immediately() {
        let store = MemoryLobbyStore::new();
        assert!(reconnect(&store).await);
    }
}
