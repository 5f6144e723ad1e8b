use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to open a MongoDB transaction")]
    BeginTransaction {
        #[source]
        source: MongoError,
    },
    #[error("failed to commit MongoDB transaction")]
    CommitTransaction {
        #[source]
        source: MongoError,
    },
    #[error("failed to load game `{id}`")]
    LoadGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to save game `{id}`")]
    SaveGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete game `{id}`")]
    DeleteGame {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load player `{id}`")]
    LoadPlayer {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to save player `{id}`")]
    SavePlayer {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to detach players from game `{game_id}`")]
    DetachPlayers {
        game_id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load board `{id}`")]
    LoadBoard {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to save board `{id}`")]
    SaveBoard {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete board `{id}`")]
    DeleteBoard {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list {collection}")]
    List {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
}
