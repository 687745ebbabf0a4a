/// Backends holding the shared game document.
pub mod game_store;
/// Persisted document model.
pub mod models;
/// Persistence provider combining the remote store with the local fallback.
pub mod persistence;
/// Storage abstraction layer for database operations.
pub mod storage;
