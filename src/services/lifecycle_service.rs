//! Create, join, start and delete games.
//!
//! Every operation runs under the game's gate, inside one unit of work, and
//! publishes its event only after the unit of work committed.

use std::{sync::Arc, time::SystemTime};

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        lobby_store::LobbyStore,
        models::{BoardEntity, GameEntity},
        storage::StorageError,
    },
    dto::ws::LobbyEvent,
    services::board_generator::{self, GenerationResult},
    state::{
        EventSink, GameGates,
        state_machine::{GameEvent, GamePhase, InvalidTransition},
    },
};

/// Failures of lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No game with this id exists.
    #[error("game `{0}` not found")]
    GameNotFound(Uuid),
    /// No player with this id exists.
    #[error("player `{0}` not found")]
    PlayerNotFound(Uuid),
    /// The game has already been started.
    #[error("game `{0}` has already been started")]
    GameAlreadyStarted(Uuid),
    /// Board generation targeted a board that does not exist.
    #[error("board `{0}` not found")]
    BoardNotFound(Uuid),
    /// Board generation targeted a board that already has cells.
    #[error("board `{0}` has already been generated")]
    BoardAlreadyGenerated(Uuid),
    /// The event is not allowed in the game's current phase.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// The store failed; nothing was committed.
    #[error("persistence failure: {0}")]
    Storage(#[from] StorageError),
}

/// Identifier and name of a freshly created game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedGame {
    /// New game id.
    pub id: Uuid,
    /// Echoed display name.
    pub name: String,
}

/// Outcome of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinAck {
    /// Game that was joined.
    pub game_id: Uuid,
    /// Player now attached to the game.
    pub player_id: Uuid,
}

/// Outcome of a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartAck {
    /// Game that was started.
    pub game_id: Uuid,
    /// Board generated for the game.
    pub board: GenerationResult,
}

/// Outcome of a successful deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAck {
    /// Game that was removed.
    pub game_id: Uuid,
    /// Board removed with the game, if it had been started.
    pub board_id: Option<Uuid>,
    /// Players whose membership was cleared.
    pub detached_players: u64,
}

/// Applies lifecycle transitions to persisted games and notifies listeners.
#[derive(Clone)]
pub struct LifecycleManager {
    store: Arc<dyn LobbyStore>,
    gates: Arc<GameGates>,
    events: Arc<dyn EventSink>,
}

impl LifecycleManager {
    /// Build a manager over `store`, serializing per game through `gates` and
    /// publishing to `events`.
    pub fn new(store: Arc<dyn LobbyStore>, gates: Arc<GameGates>, events: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            gates,
            events,
        }
    }

    /// Insert a new open game without a board.
    pub async fn create(
        &self,
        name: String,
        capacity: u32,
        private: bool,
        password: String,
    ) -> Result<CreatedGame, LifecycleError> {
        let game = GameEntity::new(name, capacity, private, password);
        let created = CreatedGame {
            id: game.id,
            name: game.name.clone(),
        };

        let mut unit = self.store.begin().await?;
        unit.insert_game(game).await?;
        unit.commit().await?;

        info!(game_id = %created.id, name = %created.name, "game created");
        self.events.publish(&LobbyEvent::GameCreated {
            game_id: created.id,
            name: created.name.clone(),
        });
        Ok(created)
    }

    /// Attach a player to a game. Capacity and started state are not checked.
    pub async fn join(&self, game_id: Uuid, player_id: Uuid) -> Result<JoinAck, LifecycleError> {
        let _gate = self.gates.acquire(game_id).await;
        let mut unit = self.store.begin().await?;

        let game = unit
            .find_game(game_id)
            .await?
            .ok_or(LifecycleError::GameNotFound(game_id))?;
        GamePhase::of(&game).next(GameEvent::Join)?;

        let mut player = unit
            .find_player(player_id)
            .await?
            .ok_or(LifecycleError::PlayerNotFound(player_id))?;
        if let Some(previous) = player.game_id.filter(|previous| *previous != game_id) {
            warn!(%player_id, %previous, %game_id, "player moves to another game");
        }
        player.game_id = Some(game_id);
        player.in_game = true;
        unit.update_player(player).await?;
        unit.commit().await?;

        info!(%game_id, %player_id, "player joined game");
        self.events
            .publish(&LobbyEvent::PlayerJoined { game_id, player_id });
        Ok(JoinAck { game_id, player_id })
    }

    /// Start a game: create its board, mark it started and generate the cells,
    /// all in one unit of work.
    pub async fn start(&self, game_id: Uuid) -> Result<StartAck, LifecycleError> {
        let _gate = self.gates.acquire(game_id).await;
        let mut unit = self.store.begin().await?;

        let mut game = unit
            .find_game(game_id)
            .await?
            .ok_or(LifecycleError::GameNotFound(game_id))?;
        let phase = GamePhase::of(&game);
        if phase == GamePhase::Started {
            return Err(LifecycleError::GameAlreadyStarted(game_id));
        }
        phase.next(GameEvent::Start)?;

        let board = BoardEntity::empty();
        let board_id = board.id;
        unit.insert_board(board).await?;

        game.board_id = Some(board_id);
        game.started = true;
        game.updated_at = SystemTime::now();
        unit.update_game(game).await?;

        let generated = board_generator::generate(unit.as_mut(), board_id).await?;
        unit.commit().await?;

        info!(%game_id, %board_id, cells = generated.cell_count, "game started");
        self.events
            .publish(&LobbyEvent::GameStarted { game_id, board_id });
        Ok(StartAck {
            game_id,
            board: generated,
        })
    }

    /// Delete a game, its board if any, and detach every joined player.
    pub async fn delete(&self, game_id: Uuid) -> Result<DeleteAck, LifecycleError> {
        let gate = self.gates.acquire(game_id).await;
        let mut unit = self.store.begin().await?;

        let game = unit
            .find_game(game_id)
            .await?
            .ok_or(LifecycleError::GameNotFound(game_id))?;
        GamePhase::of(&game).next(GameEvent::Delete)?;

        let mut removed_board = None;
        if let Some(board_id) = game.board_id {
            if unit.find_board(board_id).await?.is_some() {
                unit.delete_board(board_id).await?;
                removed_board = Some(board_id);
            } else {
                warn!(%game_id, %board_id, "game references a board that no longer exists");
            }
        }

        let detached_players = unit.detach_players(game_id).await?;
        unit.delete_game(game_id).await?;
        unit.commit().await?;
        drop(gate);

        info!(%game_id, detached_players, "game deleted");
        self.events.publish(&LobbyEvent::GameDeleted { game_id });
        Ok(DeleteAck {
            game_id,
            board_id: removed_board,
            detached_players,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::dao::{lobby_store::MemoryLobbyStore, models::PlayerEntity};

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<LobbyEvent>>,
    }

    impl EventSink for RecordingSink {
        fn publish(&self, event: &LobbyEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    impl RecordingSink {
        fn take(&self) -> Vec<LobbyEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    fn manager() -> (LifecycleManager, MemoryLobbyStore, Arc<RecordingSink>) {
        let store = MemoryLobbyStore::new();
        let sink = Arc::new(RecordingSink::default());
        let manager = LifecycleManager::new(
            Arc::new(store.clone()),
            Arc::new(GameGates::new()),
            sink.clone(),
        );
        (manager, store, sink)
    }

    async fn register_player(store: &MemoryLobbyStore, name: &str) -> PlayerEntity {
        let player = PlayerEntity::new(name.into());
        let mut unit = store.begin().await.unwrap();
        unit.insert_player(player.clone()).await.unwrap();
        unit.commit().await.unwrap();
        player
    }

    #[tokio::test]
    async fn created_game_is_open_without_board() {
        let (manager, store, sink) = manager();

        let created = manager
            .create("Lobby1".into(), 4, false, String::new())
            .await
            .unwrap();

        let games = store.list_games().await.unwrap();
        assert_eq!(games.len(), 1);
        assert!(!games[0].started);
        assert!(games[0].board_id.is_none());
        assert_eq!(
            sink.take(),
            vec![LobbyEvent::GameCreated {
                game_id: created.id,
                name: "Lobby1".into(),
            }]
        );
    }

    #[tokio::test]
    async fn start_generates_a_full_board() {
        let (manager, store, _sink) = manager();
        let created = manager
            .create("Lobby1".into(), 2, false, String::new())
            .await
            .unwrap();

        let ack = manager.start(created.id).await.unwrap();

        let game = store.list_games().await.unwrap().remove(0);
        assert!(game.started);
        assert_eq!(game.board_id, Some(ack.board.board_id));
        let board = store.find_board(ack.board.board_id).await.unwrap().unwrap();
        assert_eq!(board.cells.len(), 36);
    }

    #[tokio::test]
    async fn second_start_fails_and_keeps_the_board() {
        let (manager, store, sink) = manager();
        let created = manager
            .create("Lobby1".into(), 2, false, String::new())
            .await
            .unwrap();
        let first = manager.start(created.id).await.unwrap();
        let before = store.find_board(first.board.board_id).await.unwrap();
        sink.take();

        let err = manager.start(created.id).await.unwrap_err();

        assert!(matches!(err, LifecycleError::GameAlreadyStarted(id) if id == created.id));
        assert_eq!(store.list_boards().await.unwrap().len(), 1);
        assert_eq!(store.find_board(first.board.board_id).await.unwrap(), before);
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn start_of_unknown_game_is_not_found() {
        let (manager, store, _sink) = manager();
        let missing = Uuid::new_v4();

        let err = manager.start(missing).await.unwrap_err();

        assert!(matches!(err, LifecycleError::GameNotFound(id) if id == missing));
        assert!(store.list_boards().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn join_checks_game_before_player() {
        let (manager, store, sink) = manager();
        let alice = register_player(&store, "Alice").await;
        let missing_game = Uuid::new_v4();

        let err = manager.join(missing_game, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::GameNotFound(id) if id == missing_game));

        let err = manager.join(missing_game, alice.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::GameNotFound(_)));
        assert_eq!(store.list_players().await.unwrap(), vec![alice]);
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn join_with_unknown_player_is_not_found() {
        let (manager, _store, _sink) = manager();
        let created = manager
            .create("Lobby1".into(), 2, false, String::new())
            .await
            .unwrap();
        let missing = Uuid::new_v4();

        let err = manager.join(created.id, missing).await.unwrap_err();
        assert!(matches!(err, LifecycleError::PlayerNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn join_ignores_capacity_and_started_state() {
        let (manager, store, _sink) = manager();
        let created = manager
            .create("Solo".into(), 1, false, String::new())
            .await
            .unwrap();
        let alice = register_player(&store, "Alice").await;
        let bob = register_player(&store, "Bob").await;

        manager.join(created.id, alice.id).await.unwrap();
        manager.start(created.id).await.unwrap();
        manager.join(created.id, bob.id).await.unwrap();

        let players = store.list_players().await.unwrap();
        assert!(
            players
                .iter()
                .all(|p| p.game_id == Some(created.id) && p.in_game)
        );
    }

    #[tokio::test]
    async fn delete_removes_board_and_detaches_players() {
        let (manager, store, sink) = manager();
        let created = manager
            .create("Lobby1".into(), 2, false, String::new())
            .await
            .unwrap();
        let alice = register_player(&store, "Alice").await;
        manager.join(created.id, alice.id).await.unwrap();
        let started = manager.start(created.id).await.unwrap();
        sink.take();

        let ack = manager.delete(created.id).await.unwrap();

        assert_eq!(ack.board_id, Some(started.board.board_id));
        assert_eq!(ack.detached_players, 1);
        assert!(store.list_games().await.unwrap().is_empty());
        assert!(store.list_boards().await.unwrap().is_empty());
        let players = store.list_players().await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].game_id, None);
        assert!(!players[0].in_game);
        assert_eq!(
            sink.take(),
            vec![LobbyEvent::GameDeleted {
                game_id: created.id
            }]
        );
    }

    #[tokio::test]
    async fn delete_of_unknown_game_is_not_found() {
        let (manager, _store, sink) = manager();
        let err = manager.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::GameNotFound(_)));
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn unknown_games_leave_no_gates_behind() {
        let gates = Arc::new(GameGates::new());
        let manager = LifecycleManager::new(
            Arc::new(MemoryLobbyStore::new()),
            gates.clone(),
            Arc::new(RecordingSink::default()),
        );

        for _ in 0..100 {
            assert!(manager.start(Uuid::new_v4()).await.is_err());
            assert!(manager.join(Uuid::new_v4(), Uuid::new_v4()).await.is_err());
            assert!(manager.delete(Uuid::new_v4()).await.is_err());
        }

        assert!(gates.is_empty());
    }

    #[tokio::test]
    async fn finished_operations_leave_no_gates_behind() {
        let store = MemoryLobbyStore::new();
        let gates = Arc::new(GameGates::new());
        let manager = LifecycleManager::new(
            Arc::new(store.clone()),
            gates.clone(),
            Arc::new(RecordingSink::default()),
        );
        let created = manager
            .create("Lobby1".into(), 2, false, String::new())
            .await
            .unwrap();
        let alice = register_player(&store, "Alice").await;

        manager.join(created.id, alice.id).await.unwrap();
        manager.start(created.id).await.unwrap();
        assert!(gates.is_empty());

        manager.delete(created.id).await.unwrap();
        assert!(gates.is_empty());
    }

    #[tokio::test]
    async fn concurrent_starts_produce_a_single_board() {
        let (manager, store, _sink) = manager();
        let created = manager
            .create("Race".into(), 2, false, String::new())
            .await
            .unwrap();

        let (first, second) = tokio::join!(manager.start(created.id), manager.start(created.id));

        assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
        assert_eq!(store.list_boards().await.unwrap().len(), 1);
    }
}
