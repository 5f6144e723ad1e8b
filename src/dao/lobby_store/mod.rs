pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{BoardEntity, CellEntity, GameEntity, PlayerEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

pub use self::memory::MemoryLobbyStore;

/// Abstraction over the relational persistence of games, players, boards and cells.
///
/// Reads that do not take part in a lifecycle operation go straight to the store.
/// Every mutation goes through a [`UnitOfWork`] obtained from [`LobbyStore::begin`].
pub trait LobbyStore: Send + Sync {
    /// Open a fresh unit of work. Staged writes become visible only on commit.
    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn UnitOfWork>>>;
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    fn list_boards(&self) -> BoxFuture<'static, StorageResult<Vec<BoardEntity>>>;
    fn find_board(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<BoardEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Transactional scope for a single lifecycle operation.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] discards every
/// staged write, so early returns and `?` propagation roll back automatically.
pub trait UnitOfWork: Send {
    fn find_game(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<Option<GameEntity>>>;
    fn find_player(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<Option<PlayerEntity>>>;
    fn find_board(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<Option<BoardEntity>>>;
    fn insert_game(&mut self, game: GameEntity) -> BoxFuture<'_, StorageResult<()>>;
    fn update_game(&mut self, game: GameEntity) -> BoxFuture<'_, StorageResult<()>>;
    fn delete_game(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<()>>;
    fn insert_player(&mut self, player: PlayerEntity) -> BoxFuture<'_, StorageResult<()>>;
    fn update_player(&mut self, player: PlayerEntity) -> BoxFuture<'_, StorageResult<()>>;
    /// Clear the game reference and `in_game` flag of every player attached to `game_id`.
    /// Returns how many players were detached.
    fn detach_players(&mut self, game_id: Uuid) -> BoxFuture<'_, StorageResult<u64>>;
    fn insert_board(&mut self, board: BoardEntity) -> BoxFuture<'_, StorageResult<()>>;
    /// Attach a complete batch of cells to an existing board in a single write.
    fn insert_cells(
        &mut self,
        board_id: Uuid,
        cells: Vec<CellEntity>,
    ) -> BoxFuture<'_, StorageResult<()>>;
    /// Delete a board together with its cells.
    fn delete_board(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<()>>;
    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>>;
}
