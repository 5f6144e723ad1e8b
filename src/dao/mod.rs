/// Lobby persistence and unit-of-work abstractions.
pub mod lobby_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
