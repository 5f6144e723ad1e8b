use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, ClientSession, Collection, Database,
    bson::{Bson, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoBoardDocument, MongoGameDocument, MongoPlayerDocument, doc_id, to_bson_uuid,
    },
};
use crate::dao::{
    lobby_store::{LobbyStore, UnitOfWork},
    models::{BoardEntity, CellEntity, GameEntity, PlayerEntity},
    storage::{StorageError, StorageResult},
};

const GAME_COLLECTION_NAME: &str = "games";
const PLAYER_COLLECTION_NAME: &str = "players";
const BOARD_COLLECTION_NAME: &str = "boards";

/// MongoDB-backed [`LobbyStore`]. Units of work map onto multi-document transactions,
/// which require a replica set or sharded deployment.
#[derive(Clone)]
pub struct MongoLobbyStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoLobbyStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;
        let players = database.collection::<mongodb::bson::Document>(PLAYER_COLLECTION_NAME);
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"game_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("player_game_idx".to_owned()))
                    .build(),
            )
            .build();

        players
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: PLAYER_COLLECTION_NAME,
                index: "game_id",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn handles(&self) -> (Client, Database) {
        let guard = self.inner.state.read().await;
        (guard.client.clone(), guard.database.clone())
    }

    async fn begin_unit(&self) -> MongoResult<MongoUnitOfWork> {
        let (client, database) = self.handles().await;
        let mut session = client
            .start_session()
            .await
            .map_err(|source| MongoDaoError::BeginTransaction { source })?;
        session
            .start_transaction()
            .await
            .map_err(|source| MongoDaoError::BeginTransaction { source })?;

        Ok(MongoUnitOfWork { session, database })
    }

    async fn list_games(&self) -> MongoResult<Vec<GameEntity>> {
        let collection = self
            .database()
            .await
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME);

        let documents: Vec<MongoGameDocument> = collection
            .find(doc! {})
            .await
            .map_err(|source| list_error(GAME_COLLECTION_NAME, source))?
            .try_collect()
            .await
            .map_err(|source| list_error(GAME_COLLECTION_NAME, source))?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn list_players(&self) -> MongoResult<Vec<PlayerEntity>> {
        let collection = self
            .database()
            .await
            .collection::<MongoPlayerDocument>(PLAYER_COLLECTION_NAME);

        let documents: Vec<MongoPlayerDocument> = collection
            .find(doc! {})
            .await
            .map_err(|source| list_error(PLAYER_COLLECTION_NAME, source))?
            .try_collect()
            .await
            .map_err(|source| list_error(PLAYER_COLLECTION_NAME, source))?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn list_boards(&self) -> MongoResult<Vec<BoardEntity>> {
        let collection = self
            .database()
            .await
            .collection::<MongoBoardDocument>(BOARD_COLLECTION_NAME);

        let documents: Vec<MongoBoardDocument> = collection
            .find(doc! {})
            .await
            .map_err(|source| list_error(BOARD_COLLECTION_NAME, source))?
            .try_collect()
            .await
            .map_err(|source| list_error(BOARD_COLLECTION_NAME, source))?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_board(&self, id: Uuid) -> MongoResult<Option<BoardEntity>> {
        let collection = self
            .database()
            .await
            .collection::<MongoBoardDocument>(BOARD_COLLECTION_NAME);

        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadBoard { id, source })?;

        Ok(document.map(Into::into))
    }
}

impl LobbyStore for MongoLobbyStore {
    fn begin(&self) -> BoxFuture<'static, StorageResult<Box<dyn UnitOfWork>>> {
        let store = self.clone();
        Box::pin(async move {
            let unit: Box<dyn UnitOfWork> = Box::new(store.begin_unit().await?);
            Ok(unit)
        })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games().await.map_err(Into::into) })
    }

    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_players().await.map_err(Into::into) })
    }

    fn list_boards(&self) -> BoxFuture<'static, StorageResult<Vec<BoardEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_boards().await.map_err(Into::into) })
    }

    fn find_board(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<BoardEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_board(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}

/// Unit of work bound to a driver session with an open transaction.
/// Dropping the session without committing aborts the transaction.
struct MongoUnitOfWork {
    session: ClientSession,
    database: Database,
}

impl MongoUnitOfWork {
    fn games(&self) -> Collection<MongoGameDocument> {
        self.database.collection(GAME_COLLECTION_NAME)
    }

    fn players(&self) -> Collection<MongoPlayerDocument> {
        self.database.collection(PLAYER_COLLECTION_NAME)
    }

    fn boards(&self) -> Collection<MongoBoardDocument> {
        self.database.collection(BOARD_COLLECTION_NAME)
    }

    async fn load_board(&mut self, id: Uuid) -> MongoResult<Option<MongoBoardDocument>> {
        self.boards()
            .find_one(doc_id(id))
            .session(&mut self.session)
            .await
            .map_err(|source| MongoDaoError::LoadBoard { id, source })
    }

    async fn replace_board(&mut self, id: Uuid, document: MongoBoardDocument) -> StorageResult<()> {
        let result = self
            .boards()
            .replace_one(doc_id(id), &document)
            .session(&mut self.session)
            .await
            .map_err(|source| MongoDaoError::SaveBoard { id, source })?;

        if result.matched_count == 0 {
            return Err(StorageError::missing("board", id));
        }
        Ok(())
    }
}

impl UnitOfWork for MongoUnitOfWork {
    fn find_game(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<Option<GameEntity>>> {
        Box::pin(async move {
            let document = self
                .games()
                .find_one(doc_id(id))
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::LoadGame { id, source })?;
            Ok(document.map(Into::into))
        })
    }

    fn find_player(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<Option<PlayerEntity>>> {
        Box::pin(async move {
            let document = self
                .players()
                .find_one(doc_id(id))
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::LoadPlayer { id, source })?;
            Ok(document.map(Into::into))
        })
    }

    fn find_board(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<Option<BoardEntity>>> {
        Box::pin(async move { Ok(self.load_board(id).await?.map(Into::into)) })
    }

    fn insert_game(&mut self, game: GameEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let id = game.id;
            let document: MongoGameDocument = game.into();
            self.games()
                .insert_one(&document)
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::SaveGame { id, source })?;
            Ok(())
        })
    }

    fn update_game(&mut self, game: GameEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let id = game.id;
            let document: MongoGameDocument = game.into();
            let result = self
                .games()
                .replace_one(doc_id(id), &document)
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::SaveGame { id, source })?;

            if result.matched_count == 0 {
                return Err(StorageError::missing("game", id));
            }
            Ok(())
        })
    }

    fn delete_game(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let result = self
                .games()
                .delete_one(doc_id(id))
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::DeleteGame { id, source })?;

            if result.deleted_count == 0 {
                return Err(StorageError::missing("game", id));
            }
            Ok(())
        })
    }

    fn insert_player(&mut self, player: PlayerEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let id = player.id;
            let document: MongoPlayerDocument = player.into();
            self.players()
                .insert_one(&document)
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::SavePlayer { id, source })?;
            Ok(())
        })
    }

    fn update_player(&mut self, player: PlayerEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let id = player.id;
            let document: MongoPlayerDocument = player.into();
            let result = self
                .players()
                .replace_one(doc_id(id), &document)
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::SavePlayer { id, source })?;

            if result.matched_count == 0 {
                return Err(StorageError::missing("player", id));
            }
            Ok(())
        })
    }

    fn detach_players(&mut self, game_id: Uuid) -> BoxFuture<'_, StorageResult<u64>> {
        Box::pin(async move {
            let result = self
                .players()
                .update_many(
                    doc! {"game_id": to_bson_uuid(game_id)},
                    doc! {"$set": {"game_id": Bson::Null, "in_game": false}},
                )
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::DetachPlayers { game_id, source })?;
            Ok(result.modified_count)
        })
    }

    fn insert_board(&mut self, board: BoardEntity) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let id = board.id;
            let document: MongoBoardDocument = board.into();
            self.boards()
                .insert_one(&document)
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::SaveBoard { id, source })?;
            Ok(())
        })
    }

    fn insert_cells(
        &mut self,
        board_id: Uuid,
        cells: Vec<CellEntity>,
    ) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let mut board: BoardEntity = self
                .load_board(board_id)
                .await?
                .ok_or_else(|| StorageError::missing("board", board_id))?
                .into();
            board.cells.extend(cells);
            self.replace_board(board_id, board.into()).await
        })
    }

    fn delete_board(&mut self, id: Uuid) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let result = self
                .boards()
                .delete_one(doc_id(id))
                .session(&mut self.session)
                .await
                .map_err(|source| MongoDaoError::DeleteBoard { id, source })?;

            if result.deleted_count == 0 {
                return Err(StorageError::missing("board", id));
            }
            Ok(())
        })
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        let mut unit = *self;
        Box::pin(async move {
            unit.session
                .commit_transaction()
                .await
                .map_err(|source| MongoDaoError::CommitTransaction { source })?;
            Ok(())
        })
    }
}

fn list_error(collection: &'static str, source: mongodb::error::Error) -> MongoDaoError {
    MongoDaoError::List { collection, source }
}
