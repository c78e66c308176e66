//! Persistence layer: room records and their storage backends.

/// Database model definitions.
pub mod models;
/// Room record storage backends.
pub mod room_store;
/// Storage abstraction layer for database operations.
pub mod storage;
