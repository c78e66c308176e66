//! REST payloads of the room endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::validation::{validate_display_name, validate_room_name, validate_user_id},
    state::{
        ledger::Ranking,
        room::{Room, User},
        state_machine::RoomPhase,
    },
};

/// Identity a client presents when creating or joining a room.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct UserInput {
    /// Client-chosen id, 1 to 64 characters without whitespace.
    #[validate(custom(function = validate_user_id))]
    pub id: String,
    /// Display name, 1 to 20 characters after trimming.
    #[validate(custom(function = validate_display_name))]
    pub name: String,
}

impl From<UserInput> for User {
    fn from(value: UserInput) -> Self {
        Self {
            id: value.id,
            name: value.name.trim().to_owned(),
        }
    }
}

/// Payload used to open a new room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Room name, 1 to 50 characters after trimming.
    #[validate(custom(function = validate_room_name))]
    pub name: String,
    /// Capacity including the creator, 2 to 10.
    #[validate(range(min = 2, max = 10))]
    pub max_users: usize,
    /// Creator, who becomes the first member.
    #[validate(nested)]
    pub creator: UserInput,
    /// Secret other users must present to join.
    #[validate(length(min = 1, max = 32))]
    pub passphrase: String,
}

/// Payload used to join an existing room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinRoomRequest {
    /// Joining user.
    #[validate(nested)]
    pub user: UserInput,
    /// Secret of the room.
    pub passphrase: String,
}

/// Payload identifying the acting user, used by `start`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    /// Acting user.
    #[validate(custom(function = validate_user_id))]
    pub user_id: String,
}

/// A tap count reported for the running round, either as a final result or as a running
/// update.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    /// Reporting member.
    #[validate(custom(function = validate_user_id))]
    pub user_id: String,
    /// Taps counted so far or in total.
    pub tap_count: u32,
}

/// Room phase as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PhaseView {
    /// Waiting for a round.
    Lobby,
    /// Round running.
    Playing,
    /// Result published.
    Finished,
}

impl From<RoomPhase> for PhaseView {
    fn from(value: RoomPhase) -> Self {
        match value {
            RoomPhase::Lobby => PhaseView::Lobby,
            RoomPhase::Playing => PhaseView::Playing,
            RoomPhase::Finished => PhaseView::Finished,
        }
    }
}

/// Public view of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    /// User id.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl From<&User> for UserView {
    fn from(value: &User) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
        }
    }
}

/// Public view of a room. The passphrase is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    /// Room id.
    pub id: String,
    /// Room name.
    pub name: String,
    /// Current creator.
    pub creator_id: String,
    /// Capacity including the creator.
    pub max_users: usize,
    /// Members in join order.
    pub members: Vec<UserView>,
    /// Current phase.
    pub phase: PhaseView,
}

impl From<&Room> for RoomView {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id().to_owned(),
            name: room.name.clone(),
            creator_id: room.creator_id().to_owned(),
            max_users: room.max_users(),
            members: room.members().iter().map(UserView::from).collect(),
            phase: room.phase().into(),
        }
    }
}

/// One row of a round result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// 1-based position.
    pub rank: u32,
    /// Ranked user.
    pub user_id: String,
    /// Name of the ranked user.
    pub user_name: String,
    /// Reported taps, 0 when nothing arrived.
    pub tap_count: u32,
}

impl From<Ranking> for RankingEntry {
    fn from(value: Ranking) -> Self {
        Self {
            rank: value.rank,
            user_id: value.user_id,
            user_name: value.user_name,
            tap_count: value.tap_count,
        }
    }
}

/// Returned by `create` and `join`: the room, the caller's identity, and where to open the
/// live channel.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomAccessResponse {
    /// Room after the operation.
    pub room: RoomView,
    /// Caller as a member.
    pub user: UserView,
    /// Channel path to open for live messages.
    pub ws_path: String,
}

/// Envelope of a single room view.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    /// Requested room.
    pub room: RoomView,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    /// Always `true`; failures use an error status.
    pub success: bool,
}

impl SuccessResponse {
    /// Successful acknowledgement.
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Query string of the WebSocket upgrade.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SocketQuery {
    /// Member opening the channel.
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            name: id.to_uppercase(),
        }
    }

    #[test]
    fn room_view_hides_passphrase() {
        let room = Room::new(
            "r1".into(),
            "friday".into(),
            4,
            user("a"),
            "secret".into(),
        );
        let value = serde_json::to_value(RoomView::from(&room)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "r1",
                "name": "friday",
                "creatorId": "a",
                "maxUsers": 4,
                "members": [{"id": "a", "name": "A"}],
                "phase": "lobby",
            })
        );
        assert!(!value.to_string().contains("secret"));
    }

    #[test]
    fn create_request_bounds() {
        let parse = |body: serde_json::Value| -> CreateRoomRequest {
            serde_json::from_value(body).unwrap()
        };
        let valid = json!({
            "name": "friday",
            "maxUsers": 4,
            "creator": {"id": "a", "name": "Alice"},
            "passphrase": "pw",
        });
        assert!(parse(valid.clone()).validate().is_ok());

        let mut too_many = valid.clone();
        too_many["maxUsers"] = json!(11);
        assert!(parse(too_many).validate().is_err());

        let mut too_few = valid.clone();
        too_few["maxUsers"] = json!(1);
        assert!(parse(too_few).validate().is_err());

        let mut blank_name = valid.clone();
        blank_name["creator"]["name"] = json!("   ");
        assert!(parse(blank_name).validate().is_err());

        let mut empty_pass = valid;
        empty_pass["passphrase"] = json!("");
        assert!(parse(empty_pass).validate().is_err());
    }

    #[test]
    fn negative_tap_count_is_rejected_at_decode() {
        let result =
            serde_json::from_value::<ScoreRequest>(json!({"userId": "a", "tapCount": -1}));
        assert!(result.is_err());
    }

    #[test]
    fn user_input_trims_name() {
        let user = User::from(UserInput {
            id: "a".into(),
            name: "  Alice ".into(),
        });
        assert_eq!(user.name, "Alice");
    }
}
