/// Record store abstraction and its backends.
pub mod game_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
