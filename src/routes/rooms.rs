//! Room REST endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use axum_valid::Valid;

use crate::{
    dto::room::{
        CreateRoomRequest, JoinRoomRequest, RoomAccessResponse, RoomResponse, RoomView,
        ScoreRequest, SuccessResponse, UserIdRequest,
    },
    error::AppError,
    services::room_service,
    state::SharedState,
};

/// Room lifecycle and round endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{room_id}", get(get_room))
        .route("/rooms/{room_id}/join", post(join_room))
        .route("/rooms/{room_id}/start", post(start_round))
        .route("/rooms/{room_id}/users/{user_id}", delete(leave_room))
        .route("/rooms/{room_id}/result", post(submit_result))
        .route("/rooms/{room_id}/click", post(submit_click))
}

/// Open a new room with the caller as creator and only member.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Room created", body = RoomAccessResponse),
        (status = 400, description = "Invalid payload"),
        (status = 503, description = "Room store unavailable")
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateRoomRequest>>,
) -> Result<Json<RoomAccessResponse>, AppError> {
    let created = room_service::create_room(&state, payload).await?;
    Ok(Json(created))
}

/// List rooms currently held in memory.
#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    responses((status = 200, description = "Live rooms", body = [RoomView]))
)]
pub async fn list_rooms(State(state): State<SharedState>) -> Json<Vec<RoomView>> {
    Json(room_service::list_rooms(&state).await)
}

#[utoipa::path(
    get,
    path = "/rooms/{room_id}",
    tag = "rooms",
    params(("room_id" = String, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room found", body = RoomResponse),
        (status = 404, description = "Unknown room")
    )
)]
/// Fetch one room.
pub async fn get_room(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let room = room_service::get_room(&state, &room_id).await?;
    Ok(Json(RoomResponse { room }))
}

/// Join a room in the lobby with its passphrase.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/join",
    tag = "rooms",
    params(("room_id" = String, Path, description = "Room identifier")),
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Joined", body = RoomAccessResponse),
        (status = 400, description = "Round in progress, duplicate user or room full"),
        (status = 403, description = "Wrong passphrase"),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn join_room(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Valid(Json(payload)): Valid<Json<JoinRoomRequest>>,
) -> Result<Json<RoomAccessResponse>, AppError> {
    let joined = room_service::join_room(&state, &room_id, payload).await?;
    Ok(Json(joined))
}

/// Start a round. Only the room creator may do this.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/start",
    tag = "rooms",
    params(("room_id" = String, Path, description = "Room identifier")),
    request_body = UserIdRequest,
    responses(
        (status = 200, description = "Round started", body = SuccessResponse),
        (status = 400, description = "Round already in progress"),
        (status = 403, description = "Caller is not the creator"),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn start_round(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Valid(Json(payload)): Valid<Json<UserIdRequest>>,
) -> Result<Json<SuccessResponse>, AppError> {
    room_service::start_round(&state, &room_id, payload.user_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Leave a room. Succeeds without effect when the user is not a member.
#[utoipa::path(
    delete,
    path = "/rooms/{room_id}/users/{user_id}",
    tag = "rooms",
    params(
        ("room_id" = String, Path, description = "Room identifier"),
        ("user_id" = String, Path, description = "Leaving user")
    ),
    responses(
        (status = 200, description = "Left", body = SuccessResponse),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn leave_room(
    State(state): State<SharedState>,
    Path((room_id, user_id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, AppError> {
    room_service::leave_room(&state, &room_id, user_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Report a final tap count for the running round.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/result",
    tag = "rooms",
    params(("room_id" = String, Path, description = "Room identifier")),
    request_body = ScoreRequest,
    responses(
        (status = 200, description = "Score recorded", body = SuccessResponse),
        (status = 400, description = "No round is active"),
        (status = 404, description = "Unknown room or user")
    )
)]
pub async fn submit_result(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Valid(Json(payload)): Valid<Json<ScoreRequest>>,
) -> Result<Json<SuccessResponse>, AppError> {
    room_service::submit_score(&state, &room_id, payload).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Report a running tap count. Same rules as `/result`.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/click",
    tag = "rooms",
    params(("room_id" = String, Path, description = "Room identifier")),
    request_body = ScoreRequest,
    responses(
        (status = 200, description = "Score recorded", body = SuccessResponse),
        (status = 400, description = "No round is active"),
        (status = 404, description = "Unknown room or user")
    )
)]
pub async fn submit_click(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Valid(Json(payload)): Valid<Json<ScoreRequest>>,
) -> Result<Json<SuccessResponse>, AppError> {
    room_service::submit_score(&state, &room_id, payload).await?;
    Ok(Json(SuccessResponse::ok()))
}
