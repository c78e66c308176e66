//! In-process room store. Records are kept as serialized JSON so reads go through the same
//! decoding path as the networked backends.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::dao::{
    models::RoomEntity,
    room_store::RoomStore,
    storage::{StorageError, StorageResult},
};

/// Room store backed by a concurrent map; contents do not survive the process.
#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    records: Arc<DashMap<String, String>>,
}

impl MemoryRoomStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RoomStore for MemoryRoomStore {
    fn get(&self, room_id: &str) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let raw = self.records.get(room_id).map(|entry| entry.value().clone());
        let room_id = room_id.to_owned();
        Box::pin(async move {
            raw.map(|text| {
                serde_json::from_str::<RoomEntity>(&text).map_err(|err| {
                    StorageError::unavailable(format!("corrupt record for room `{room_id}`"), err)
                })
            })
            .transpose()
        })
    }

    fn put(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        let records = Arc::clone(&self.records);
        Box::pin(async move {
            let text = serde_json::to_string(&room).map_err(|err| {
                StorageError::unavailable(format!("failed to encode room `{}`", room.id), err)
            })?;
            records.insert(room.id, text);
            Ok(())
        })
    }

    fn delete(&self, room_id: &str) -> BoxFuture<'static, StorageResult<()>> {
        self.records.remove(room_id);
        Box::pin(async { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{PhaseEntity, UserEntity};

    fn sample(id: &str) -> RoomEntity {
        RoomEntity {
            id: id.into(),
            name: "after lunch".into(),
            creator_id: "u1".into(),
            max_users: 4,
            members: vec![UserEntity {
                id: "u1".into(),
                name: "Aki".into(),
            }],
            passphrase: "hunter2".into(),
            phase: PhaseEntity::Lobby,
        }
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = MemoryRoomStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_get_delete() {
        let store = MemoryRoomStore::new();
        store.put(sample("r1")).await.unwrap();
        assert_eq!(store.get("r1").await.unwrap(), Some(sample("r1")));

        store.delete("r1").await.unwrap();
        assert!(store.get("r1").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn record_uses_camel_case_and_lowercase_phase() {
        let value = serde_json::to_value(sample("r1")).unwrap();
        assert_eq!(value["creatorId"], "u1");
        assert_eq!(value["maxUsers"], 4);
        assert_eq!(value["phase"], "lobby");
    }
}
