//! MongoDB document layout of a room.

use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};

use crate::dao::models::{PhaseEntity, RoomEntity, UserEntity};

/// Room document stored in the `rooms` collection, keyed by the room identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoRoomDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    creator_id: String,
    max_users: i64,
    members: Vec<UserEntity>,
    passphrase: String,
    phase: PhaseEntity,
}

impl From<RoomEntity> for MongoRoomDocument {
    fn from(value: RoomEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            creator_id: value.creator_id,
            max_users: value.max_users as i64,
            members: value.members,
            passphrase: value.passphrase,
            phase: value.phase,
        }
    }
}

impl From<MongoRoomDocument> for RoomEntity {
    fn from(value: MongoRoomDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            creator_id: value.creator_id,
            max_users: usize::try_from(value.max_users).unwrap_or_default(),
            members: value.members,
            passphrase: value.passphrase,
            phase: value.phase,
        }
    }
}

/// Filter selecting the document of room `id`.
pub fn doc_id(id: &str) -> Document {
    doc! {"_id": id}
}
