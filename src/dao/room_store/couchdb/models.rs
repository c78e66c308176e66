//! CouchDB document layout of a room.

use serde::{Deserialize, Serialize};

use crate::dao::models::{PhaseEntity, RoomEntity, UserEntity};

/// Prefix of every room document id.
pub const ROOM_PREFIX: &str = "room::";

/// Document id of `room_id`.
pub fn room_doc_id(room_id: &str) -> String {
    format!("{ROOM_PREFIX}{room_id}")
}

/// A room as stored in CouchDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchRoomDocument {
    /// Document id, see [`room_doc_id`].
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision; absent when the document is new.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Room fields.
    #[serde(flatten)]
    pub room: RoomBody,
}

/// Room fields stored next to CouchDB's `_id`/`_rev` metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomBody {
    /// Room id without the document prefix.
    pub room_id: String,
    /// Display name of the room.
    pub name: String,
    /// Current creator.
    pub creator_id: String,
    /// Capacity including the creator.
    pub max_users: usize,
    /// Members in join order.
    pub members: Vec<UserEntity>,
    /// Secret required to join.
    pub passphrase: String,
    /// Persisted phase.
    pub phase: PhaseEntity,
}

/// Minimal projection used to read the current revision of a document.
#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    /// Current revision of the document.
    #[serde(rename = "_rev")]
    pub rev: String,
}

impl From<(RoomEntity, Option<String>)> for CouchRoomDocument {
    fn from((room, rev): (RoomEntity, Option<String>)) -> Self {
        Self {
            id: room_doc_id(&room.id),
            rev,
            room: RoomBody {
                room_id: room.id,
                name: room.name,
                creator_id: room.creator_id,
                max_users: room.max_users,
                members: room.members,
                passphrase: room.passphrase,
                phase: room.phase,
            },
        }
    }
}

impl From<CouchRoomDocument> for RoomEntity {
    fn from(value: CouchRoomDocument) -> Self {
        let body = value.room;
        Self {
            id: body.room_id,
            name: body.name,
            creator_id: body.creator_id,
            max_users: body.max_users,
            members: body.members,
            passphrase: body.passphrase,
            phase: body.phase,
        }
    }
}
