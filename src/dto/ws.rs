//! Messages exchanged over room channels.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::room::{RankingEntry, RoomView};

/// Messages pushed to every connected client of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once, right after a channel opens.
    RoomInfo {
        /// Room as the new channel first sees it.
        room: RoomView,
    },
    /// Membership changed.
    RoomUpdated {
        /// Room after the change.
        room: RoomView,
    },
    /// Sent to everyone when a join fills the last seat.
    RoomFull {
        /// Room that just reached capacity.
        room: RoomView,
    },
    /// A round started. `wait` is the countdown and `duration` the round length, in seconds.
    GameStart {
        /// Countdown in seconds before tapping begins.
        wait: u64,
        /// Playing time in seconds.
        duration: u64,
    },
    /// The round ended.
    GameResult {
        /// Every member, best first.
        rankings: Vec<RankingEntry>,
    },
}

/// Messages accepted from room clients.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Running tap count update.
    #[serde(rename_all = "camelCase")]
    Click {
        /// Reporting member; must match the channel's user.
        user_id: String,
        /// Taps counted so far.
        #[serde(alias = "clickCount")]
        tap_count: u32,
    },
    /// Any other `type`; logged and dropped.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Decode one text frame.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
