//! Room channel endpoint.

use axum::{
    Router,
    extract::{Path, Query, State, WebSocketUpgrade, ws::Message},
    response::IntoResponse,
    routing::get,
};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    dto::room::SocketQuery,
    error::AppError,
    services::{
        room_service,
        websocket_service::{self, SocketSession},
    },
    state::{SharedState, connections::Connection},
};

#[utoipa::path(
    get,
    path = "/ws/{room_id}",
    tag = "rooms",
    params(
        ("room_id" = String, Path, description = "Room identifier"),
        ("userId" = String, Query, description = "Member opening the channel")
    ),
    responses(
        (status = 101, description = "Switching protocols to WebSocket"),
        (status = 400, description = "Malformed user id"),
        (status = 404, description = "Unknown room or user")
    )
)]
/// Open a live channel for a room member. The member is checked before the upgrade.
pub async fn ws_handler(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Query(query): Query<SocketQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<Message>();
    let connection_id = Uuid::new_v4();
    room_service::open_channel(
        &state,
        &room_id,
        &query.user_id,
        Connection {
            id: connection_id,
            tx: outbound_tx.clone(),
        },
    )
    .await?;

    let session = SocketSession {
        room_id,
        user_id: query.user_id,
        connection_id,
    };
    Ok(ws.on_upgrade(move |socket| {
        websocket_service::handle_socket(state, session, socket, outbound_tx, outbound_rx)
    }))
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/ws/{room_id}", get(ws_handler))
}
