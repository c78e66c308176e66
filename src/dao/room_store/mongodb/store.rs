//! MongoDB implementation of [`RoomStore`](crate::dao::room_store::RoomStore).

use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{Collection, Database, bson::doc};

use super::{
    config::MongoConfig,
    connection::open_database,
    error::{MongoDaoError, MongoResult},
    models::{MongoRoomDocument, doc_id},
};
use crate::dao::{models::RoomEntity, room_store::RoomStore, storage::StorageResult};

const ROOM_COLLECTION_NAME: &str = "rooms";

/// Room store backed by a MongoDB collection.
#[derive(Clone)]
pub struct MongoRoomStore {
    database: Arc<Database>,
}

impl MongoRoomStore {
    /// Establish a connection to MongoDB.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = open_database(&config).await?;
        Ok(Self {
            database: Arc::new(database),
        })
    }

    fn collection(&self) -> Collection<MongoRoomDocument> {
        self.database
            .collection::<MongoRoomDocument>(ROOM_COLLECTION_NAME)
    }

    async fn find_room(&self, id: String) -> MongoResult<Option<RoomEntity>> {
        let document = self
            .collection()
            .find_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::LoadRoom { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn save_room(&self, room: RoomEntity) -> MongoResult<()> {
        let id = room.id.clone();
        let document: MongoRoomDocument = room.into();
        self.collection()
            .replace_one(doc_id(&id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveRoom { id, source })?;
        Ok(())
    }

    async fn delete_room(&self, id: String) -> MongoResult<()> {
        self.collection()
            .delete_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::DeleteRoom { id, source })?;
        Ok(())
    }

    async fn ping(&self) -> MongoResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }
}

impl RoomStore for MongoRoomStore {
    fn get(&self, room_id: &str) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let store = self.clone();
        let id = room_id.to_owned();
        Box::pin(async move { store.find_room(id).await.map_err(Into::into) })
    }

    fn put(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_room(room).await.map_err(Into::into) })
    }

    fn delete(&self, room_id: &str) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let id = room_id.to_owned();
        Box::pin(async move { store.delete_room(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
