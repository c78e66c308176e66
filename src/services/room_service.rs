//! Room operations routed to the owning coordinator.

use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{
        room::{
            CreateRoomRequest, JoinRoomRequest, RoomAccessResponse, RoomView, ScoreRequest,
            UserView,
        },
        validation::validate_user_id,
    },
    error::ServiceError,
    state::{
        SharedState,
        connections::Connection,
        room::{Room, User},
    },
};

/// Path a member opens to receive the room's live messages. The user id is form-encoded so it
/// decodes back unchanged through the `userId` query parameter.
fn ws_path(room_id: &str, user_id: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("userId", user_id)
        .finish();
    format!("/ws/{room_id}?{query}")
}

fn access(room: RoomView, user: &User) -> RoomAccessResponse {
    RoomAccessResponse {
        ws_path: ws_path(&room.id, &user.id),
        room,
        user: UserView::from(user),
    }
}

/// Open a new room under a freshly generated id, with the caller as creator.
pub async fn create_room(
    state: &SharedState,
    request: CreateRoomRequest,
) -> Result<RoomAccessResponse, ServiceError> {
    let room_id = Uuid::new_v4().to_string();
    let creator = User::from(request.creator);
    let room = Room::new(
        room_id.clone(),
        request.name.trim().to_owned(),
        request.max_users,
        creator.clone(),
        request.passphrase,
    );

    let view = state
        .rooms()
        .dispatch(&room_id, |handle| {
            let room = room.clone();
            async move { handle.create(room).await }
        })
        .await?;
    Ok(access(view, &creator))
}

/// Views of the rooms currently held in memory.
pub async fn list_rooms(state: &SharedState) -> Vec<RoomView> {
    state.rooms().list().await
}

/// Current view of one room.
pub async fn get_room(state: &SharedState, room_id: &str) -> Result<RoomView, ServiceError> {
    state
        .rooms()
        .dispatch(room_id, |handle| async move { handle.snapshot().await })
        .await
}

/// Add a member to a room in the lobby.
pub async fn join_room(
    state: &SharedState,
    room_id: &str,
    request: JoinRoomRequest,
) -> Result<RoomAccessResponse, ServiceError> {
    let user = User::from(request.user);
    let view = state
        .rooms()
        .dispatch(room_id, |handle| {
            let user = user.clone();
            let passphrase = request.passphrase.clone();
            async move { handle.join(user, passphrase).await }
        })
        .await?;
    Ok(access(view, &user))
}

/// Start a round as the room creator.
pub async fn start_round(
    state: &SharedState,
    room_id: &str,
    user_id: String,
) -> Result<(), ServiceError> {
    state
        .rooms()
        .dispatch(room_id, |handle| {
            let user_id = user_id.clone();
            async move { handle.start(user_id).await }
        })
        .await
}

/// Remove a member. Leaving a room one is not part of succeeds without effect.
pub async fn leave_room(
    state: &SharedState,
    room_id: &str,
    user_id: String,
) -> Result<(), ServiceError> {
    state
        .rooms()
        .dispatch(room_id, |handle| {
            let user_id = user_id.clone();
            async move { handle.leave(user_id).await }
        })
        .await
}

/// Record a tap count for the running round. Final results and running updates share this path.
pub async fn submit_score(
    state: &SharedState,
    room_id: &str,
    request: ScoreRequest,
) -> Result<(), ServiceError> {
    state
        .rooms()
        .dispatch(room_id, |handle| {
            let user_id = request.user_id.clone();
            let tap_count = request.tap_count;
            async move { handle.submit_score(user_id, tap_count).await }
        })
        .await
}

/// Attach a client channel of `user_id`. The room immediately queues `room_info` on it.
pub async fn open_channel(
    state: &SharedState,
    room_id: &str,
    user_id: &str,
    connection: Connection,
) -> Result<(), ServiceError> {
    validate_user_id(user_id).map_err(|err| {
        ServiceError::InvalidInput(
            err.message
                .map(|message| message.into_owned())
                .unwrap_or_else(|| "invalid user id".into()),
        )
    })?;
    state
        .rooms()
        .dispatch(room_id, |handle| {
            let user_id = user_id.to_owned();
            let connection = connection.clone();
            async move { handle.connect(user_id, connection).await }
        })
        .await?;
    info!(room_id = %room_id, user_id = %user_id, "client channel attached");
    Ok(())
}

/// Forget one client channel; the user stays a member.
pub async fn close_channel(state: &SharedState, room_id: &str, user_id: &str, connection_id: Uuid) {
    if let Some(handle) = state.rooms().live(room_id) {
        handle.disconnect(user_id.to_owned(), connection_id).await;
    }
}
