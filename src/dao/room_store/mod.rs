//! Room record storage backends.

#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::RoomEntity;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

pub use memory::MemoryRoomStore;

/// Durable key-value persistence for room records, one record per room identifier.
///
/// Absence of a record means the room does not exist.
pub trait RoomStore: Send + Sync {
    /// Load the record of `room_id`, `None` when the room does not exist.
    fn get(&self, room_id: &str) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Create or replace the record keyed by `room.id`.
    fn put(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove the record of `room_id`. Removing a missing record succeeds.
    fn delete(&self, room_id: &str) -> BoxFuture<'static, StorageResult<()>>;
    /// Check that the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
