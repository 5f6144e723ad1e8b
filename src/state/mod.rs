pub mod board;
pub mod gates;
pub mod hub;
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig, dao::lobby_store::LobbyStore, error::ServiceError,
    services::lifecycle_service::LifecycleManager,
};

pub use self::gates::GameGates;
pub use self::hub::{ConnectionId, EventSink, NotificationHub};

/// Shared handle passed to every route and background task.
pub type SharedState = Arc<AppState>;

/// Central application state storing live connections and the storage handle.
pub struct AppState {
    config: AppConfig,
    lobby_store: RwLock<Option<Arc<dyn LobbyStore>>>,
    hub: Arc<NotificationHub>,
    gates: Arc<GameGates>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            lobby_store: RwLock::new(None),
            hub: Arc::new(NotificationHub::new()),
            gates: Arc::new(GameGates::new()),
            degraded: degraded_tx,
        })
    }

    /// Runtime configuration the process was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn lobby_store(&self) -> Option<Arc<dyn LobbyStore>> {
        let guard = self.lobby_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_lobby_store(&self) -> Result<Arc<dyn LobbyStore>, ServiceError> {
        self.lobby_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn set_lobby_store(&self, store: Arc<dyn LobbyStore>) {
        {
            let mut guard = self.lobby_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_lobby_store(&self) {
        {
            let mut guard = self.lobby_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let flagged = *self.degraded.borrow();
        flagged || self.lobby_store.read().await.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Hub holding every connected WebSocket client.
    pub fn hub(&self) -> &Arc<NotificationHub> {
        &self.hub
    }

    /// Build a lifecycle manager over the installed store.
    pub async fn lifecycle(&self) -> Result<LifecycleManager, ServiceError> {
        let store = self.require_lobby_store().await?;
        let events: Arc<dyn EventSink> = self.hub.clone();
        Ok(LifecycleManager::new(store, self.gates.clone(), events))
    }
}
