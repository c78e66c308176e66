//! Persisted representation of a room record.

use serde::{Deserialize, Serialize};

/// Stored phase of a room, written as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseEntity {
    /// Waiting for the creator to start a round.
    Lobby,
    /// A round is running.
    Playing,
    /// The last round has published its result.
    Finished,
}

/// Member of a room as stored in the room record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntity {
    /// Client-chosen user id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// The whole room aggregate, stored as a single record keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEntity {
    /// Room id, also the storage key.
    pub id: String,
    /// Display name of the room.
    pub name: String,
    /// Current creator; always a member.
    pub creator_id: String,
    /// Capacity including the creator.
    pub max_users: usize,
    /// Members in join order.
    pub members: Vec<UserEntity>,
    /// Secret required to join.
    pub passphrase: String,
    /// Phase at the time of the last write.
    pub phase: PhaseEntity,
}
