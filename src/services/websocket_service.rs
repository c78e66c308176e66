//! Lifecycle of one room channel.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{room::ScoreRequest, ws::ClientMessage},
    error::ServiceError,
    services::room_service,
    state::SharedState,
};

/// Identity of one attached client channel.
#[derive(Debug, Clone)]
pub struct SocketSession {
    /// Room the channel belongs to.
    pub room_id: String,
    /// Member holding the channel.
    pub user_id: String,
    /// Id under which the channel is registered.
    pub connection_id: Uuid,
}

/// Why an inbound click was not applied. Never fatal for the connection.
#[derive(Debug, Error)]
enum ClickError {
    #[error("click ignored: mismatched user (expected {expected}, got {got})")]
    MismatchedUser { expected: String, got: String },
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Drive one room channel after the upgrade. The channel is already registered with the room,
/// which has queued `room_info` on `outbound_rx`.
pub async fn handle_socket(
    state: SharedState,
    session: SocketSession,
    socket: WebSocket,
    outbound_tx: mpsc::UnboundedSender<Message>,
    mut outbound_rx: mpsc::UnboundedReceiver<Message>,
) {
    let (mut sender, mut receiver) = socket.split();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let SocketSession {
        ref room_id,
        ref user_id,
        connection_id,
    } = session;

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                debug!(room_id = %room_id, user_id = %user_id, payload = %text, "received client message");
                match ClientMessage::from_json_str(text.as_str()) {
                    Ok(ClientMessage::Click {
                        user_id: sender_id,
                        tap_count,
                    }) => {
                        if let Err(err) =
                            handle_click(&state, &session, sender_id, tap_count).await
                        {
                            warn!(room_id = %room_id, user_id = %user_id, error = %err, "click rejected");
                        }
                    }
                    Ok(ClientMessage::Unknown) => {
                        warn!(room_id = %room_id, user_id = %user_id, payload = %text, "ignoring unknown message type");
                    }
                    Err(err) => {
                        warn!(room_id = %room_id, user_id = %user_id, error = %err, "failed to parse client message");
                    }
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(room_id = %room_id, user_id = %user_id, "client closed channel");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {
                warn!(room_id = %room_id, user_id = %user_id, "ignoring binary frame");
            }
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(room_id = %room_id, user_id = %user_id, error = %err, "websocket error");
                break;
            }
        }
    }

    room_service::close_channel(&state, room_id, user_id, connection_id).await;
    info!(room_id = %room_id, user_id = %user_id, "client channel detached");

    finalize(writer_task, outbound_tx).await;
}

async fn handle_click(
    state: &SharedState,
    session: &SocketSession,
    sender_id: String,
    tap_count: u32,
) -> Result<(), ClickError> {
    if sender_id != session.user_id {
        return Err(ClickError::MismatchedUser {
            expected: session.user_id.clone(),
            got: sender_id,
        });
    }
    room_service::submit_score(
        state,
        &session.room_id,
        ScoreRequest {
            user_id: sender_id,
            tap_count,
        },
    )
    .await?;
    Ok(())
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{config::AppConfig, dao::room_store::MemoryRoomStore, state::AppState};

    #[tokio::test]
    async fn click_for_another_user_is_dropped() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryRoomStore::new()));
        let session = SocketSession {
            room_id: "r1".into(),
            user_id: "a".into(),
            connection_id: Uuid::new_v4(),
        };
        let err = handle_click(&state, &session, "b".into(), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ClickError::MismatchedUser { .. }));
        assert_eq!(state.rooms().live_count(), 0);
    }
}
