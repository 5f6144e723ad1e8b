//! In-process [`LobbyStore`] backed by ordered maps.
//!
//! Units of work stage their writes in an overlay and apply them under a single
//! write lock on commit, so readers never observe half of an operation.
//! Detaching players is staged as a condition on the game id and re-checked at
//! commit, so a player who moved to another game in the meantime keeps it.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LobbyStore, UnitOfWork};
use crate::dao::{
    models::{BoardEntity, CellEntity, GameEntity, PlayerEntity},
    storage::{StorageError, StorageResult},
};

#[derive(Debug, Default)]
struct Tables {
    games: IndexMap<Uuid, GameEntity>,
    players: IndexMap<Uuid, PlayerEntity>,
    boards: IndexMap<Uuid, BoardEntity>,
}

/// Memory-backed store used for local runs and tests.
#[derive(Clone, Default)]
pub struct MemoryLobbyStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryLobbyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LobbyStore for MemoryLobbyStore {
    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn UnitOfWork>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let unit: Box<dyn UnitOfWork> = Box::new(MemoryUnitOfWork {
                tables,
                staged: Staged::default(),
            });
            Ok(unit)
        })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.games.values().cloned().collect()) })
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.players.values().cloned().collect()) })
    }

    fn list_boards(&self) -> BoxFuture<'static, StorageResult<Vec<BoardEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.boards.values().cloned().collect()) })
    }

    fn find_board(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<BoardEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.boards.get(&id).cloned()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Pending writes of a unit of work. `None` marks a deletion.
#[derive(Default)]
struct Staged {
    games: IndexMap<Uuid, Option<GameEntity>>,
    players: IndexMap<Uuid, Option<PlayerEntity>>,
    boards: IndexMap<Uuid, Option<BoardEntity>>,
    /// Games whose stored members are cleared at commit.
    detached_games: Vec<Uuid>,
}

impl Staged {
    fn detached_view(&self, mut player: PlayerEntity) -> PlayerEntity {
        if player
            .game_id
            .is_some_and(|game_id| self.detached_games.contains(&game_id))
        {
            player.game_id = None;
            player.in_game = false;
        }
        player
    }
}

struct MemoryUnitOfWork {
    tables: Arc<RwLock<Tables>>,
    staged: Staged,
}

impl MemoryUnitOfWork {
    async fn game(&self, id: Uuid) -> Option<GameEntity> {
        match self.staged.games.get(&id) {
            Some(entry) => entry.clone(),
            None => self.tables.read().await.games.get(&id).cloned(),
        }
    }

    async fn player(&self, id: Uuid) -> Option<PlayerEntity> {
        match self.staged.players.get(&id) {
            Some(entry) => entry.clone(),
            None => {
                let stored = self.tables.read().await.players.get(&id).cloned();
                stored.map(|player| self.staged.detached_view(player))
            }
        }
    }

    async fn board(&self, id: Uuid) -> Option<BoardEntity> {
        match self.staged.boards.get(&id) {
            Some(entry) => entry.clone(),
            None => self.tables.read().await.boards.get(&id).cloned(),
        }
    }

    async fn stored_members(&self, game_id: Uuid) -> usize {
        if self.staged.detached_games.contains(&game_id) {
            return 0;
        }
        let tables = self.tables.read().await;
        tables
            .players
            .values()
            .filter(|player| player.game_id == Some(game_id))
            .filter(|player| !self.staged.players.contains_key(&player.id))
            .count()
    }
}

impl UnitOfWork for MemoryUnitOfWork {
    fn find_game(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<Option<GameEntity>>> {
        Box::pin(async move { Ok(self.game(id).await) })
    }

    fn find_player(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<Option<PlayerEntity>>> {
        Box::pin(async move { Ok(self.player(id).await) })
    }

    fn find_board(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<Option<BoardEntity>>> {
        Box::pin(async move { Ok(self.board(id).await) })
    }

    fn insert_game(&mut self, game: GameEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.staged.games.insert(game.id, Some(game));
            Ok(())
        })
    }

    fn update_game(&mut self, game: GameEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            if self.game(game.id).await.is_none() {
                return Err(StorageError::missing("game", game.id));
            }
            self.staged.games.insert(game.id, Some(game));
            Ok(())
        })
    }

    fn delete_game(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            if self.game(id).await.is_none() {
                return Err(StorageError::missing("game", id));
            }
            self.staged.games.insert(id, None);
            Ok(())
        })
    }

    fn insert_player(&mut self, player: PlayerEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.staged.players.insert(player.id, Some(player));
            Ok(())
        })
    }

    fn update_player(&mut self, player: PlayerEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            if self.player(player.id).await.is_none() {
                return Err(StorageError::missing("player", player.id));
            }
            self.staged.players.insert(player.id, Some(player));
            Ok(())
        })
    }

    fn detach_players(&mut self, game_id: Uuid) -> BoxFuture<'_, StorageResult<u64>> {
        Box::pin(async move {
            let mut count = self.stored_members(game_id).await as u64;
            for player in self.staged.players.values_mut().flatten() {
                if player.game_id == Some(game_id) {
                    player.game_id = None;
                    player.in_game = false;
                    count += 1;
                }
            }
            if !self.staged.detached_games.contains(&game_id) {
                self.staged.detached_games.push(game_id);
            }
            Ok(count)
        })
    }

    fn insert_board(&mut self, board: BoardEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            self.staged.boards.insert(board.id, Some(board));
            Ok(())
        })
    }

    fn insert_cells(
        &mut self,
        board_id: Uuid,
        cells: Vec<CellEntity>,
    ) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let mut board = self
                .board(board_id)
                .await
                .ok_or_else(|| StorageError::missing("board", board_id))?;
            board.cells.extend(cells);
            self.staged.boards.insert(board_id, Some(board));
            Ok(())
        })
    }

    fn delete_board(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            if self.board(id).await.is_none() {
                return Err(StorageError::missing("board", id));
            }
            self.staged.boards.insert(id, None);
            Ok(())
        })
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        let MemoryUnitOfWork { tables, staged } = *self;
        Box::pin(async move {
            let mut guard = tables.write().await;
            for player in guard.players.values_mut() {
                if player
                    .game_id
                    .is_some_and(|game_id| staged.detached_games.contains(&game_id))
                {
                    player.game_id = None;
                    player.in_game = false;
                }
            }
            apply(&mut guard.games, staged.games);
            apply(&mut guard.players, staged.players);
            apply(&mut guard.boards, staged.boards);
            Ok(())
        })
    }
}

fn apply<T>(table: &mut IndexMap<Uuid, T>, staged: IndexMap<Uuid, Option<T>>) {
    for (id, entry) in staged {
        match entry {
            Some(row) => {
                table.insert(id, row);
            }
            None => {
                table.shift_remove(&id);
            }
        }
    }
}
