//! Lobby Back binary entrypoint wiring REST, WebSocket notifications and the storage backend.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lobby_back::{
    config::{AppConfig, StorageSettings},
    dao::{
        lobby_store::{LobbyStore, MemoryLobbyStore},
        storage::StorageError,
    },
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let port = config.port;
    let settings = config.storage.clone();

    let app_state = AppState::new(config);

    tokio::spawn(storage_supervisor::run(app_state.clone(), move || {
        connect_store(settings.clone())
    }));
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal(app_state))
        .await
        .context("serving axum")?;

    Ok(())
}

/// Open the configured storage backend.
async fn connect_store(settings: StorageSettings) -> Result<Arc<dyn LobbyStore>, StorageError> {
    match settings {
        StorageSettings::Memory => Ok(Arc::new(MemoryLobbyStore::new())),
        #[cfg(feature = "mongo-store")]
        StorageSettings::Mongo { uri, database } => {
            use lobby_back::dao::lobby_store::mongodb::{MongoConfig, MongoLobbyStore};

            let config = MongoConfig::from_uri(&uri, database.as_deref()).await?;
            let store = MongoLobbyStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongo-store"))]
        StorageSettings::Mongo { .. } => Err(StorageError::unavailable(
            "MongoDB backend requested but the `mongo-store` feature is disabled".into(),
            std::io::Error::from(std::io::ErrorKind::Unsupported),
        )),
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM, then close every WebSocket client.
async fn shutdown_signal(state: SharedState) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!(clients = state.hub().len(), "shutting down; closing client connections");
    state.hub().close_all();
}
