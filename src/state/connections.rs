//! Open client channels of one room.

use std::collections::HashMap;

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dto::ws::ServerMessage;

/// Sending half of one client channel. Frames queued here are drained by the socket's writer
/// task.
pub type ConnectionTx = mpsc::UnboundedSender<Message>;

/// One open client channel ("tab") of a room member.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Channel id, unique per open socket.
    pub id: Uuid,
    /// Queue drained by the socket writer.
    pub tx: ConnectionTx,
}

/// Open channels of a room grouped by user. A user may hold several.
///
/// Owned by the room coordinator; never shared across tasks.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    by_user: HashMap<String, Vec<Connection>>,
}

impl ConnectionRegistry {
    /// Add a channel of `user_id`.
    pub fn register(&mut self, user_id: &str, connection: Connection) {
        debug!(user_id = %user_id, connection_id = %connection.id, "channel registered");
        self.by_user
            .entry(user_id.to_owned())
            .or_default()
            .push(connection);
    }

    /// Drop a single channel. Other channels of the same user stay registered.
    pub fn deregister(&mut self, user_id: &str, connection_id: Uuid) {
        if let Some(connections) = self.by_user.get_mut(user_id) {
            connections.retain(|conn| conn.id != connection_id);
            if connections.is_empty() {
                self.by_user.remove(user_id);
            }
        }
    }

    /// Drop every channel of `user_id`. Their writer tasks end once the senders are gone.
    pub fn remove_user(&mut self, user_id: &str) {
        self.by_user.remove(user_id);
    }

    #[cfg(test)]
    pub(crate) fn connection_count(&self) -> usize {
        self.by_user.values().map(Vec::len).sum()
    }

    /// Queue `message` on every channel of `user_id`.
    pub fn send_to_user(&mut self, user_id: &str, message: &ServerMessage) {
        let Some(frame) = encode(message) else {
            return;
        };
        if let Some(connections) = self.by_user.get_mut(user_id) {
            deliver(user_id, connections, &frame);
            if connections.is_empty() {
                self.by_user.remove(user_id);
            }
        }
    }

    /// Queue `message` on every open channel of the room.
    pub fn broadcast(&mut self, message: &ServerMessage) {
        let Some(frame) = encode(message) else {
            return;
        };
        for (user_id, connections) in self.by_user.iter_mut() {
            deliver(user_id, connections, &frame);
        }
        self.by_user.retain(|_, connections| !connections.is_empty());
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(payload) => Some(payload),
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{message:?}`");
            None
        }
    }
}

/// A failed send only closes that channel. Membership is never touched here.
fn deliver(user_id: &str, connections: &mut Vec<Connection>, frame: &str) {
    connections.retain(|conn| {
        if conn.tx.send(Message::Text(frame.into())).is_ok() {
            true
        } else {
            warn!(
                user_id = %user_id,
                connection_id = %conn.id,
                "send failed (writer closed), dropping channel"
            );
            false
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (Connection, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Connection {
                id: Uuid::new_v4(),
                tx,
            },
            rx,
        )
    }

    fn text(rx: &mut mpsc::UnboundedReceiver<Message>) -> serde_json::Value {
        match rx.try_recv().unwrap() {
            Message::Text(payload) => serde_json::from_str(payload.as_str()).unwrap(),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    fn start() -> ServerMessage {
        ServerMessage::GameStart {
            wait: 3,
            duration: 10,
        }
    }

    #[test]
    fn broadcast_reaches_every_tab() {
        let mut registry = ConnectionRegistry::default();
        let (a1, mut rx_a1) = channel();
        let (a2, mut rx_a2) = channel();
        let (b1, mut rx_b1) = channel();
        registry.register("a", a1);
        registry.register("a", a2);
        registry.register("b", b1);

        registry.broadcast(&start());

        for rx in [&mut rx_a1, &mut rx_a2, &mut rx_b1] {
            assert_eq!(text(rx)["type"], "game_start");
        }
    }

    #[test]
    fn send_to_user_targets_only_that_user() {
        let mut registry = ConnectionRegistry::default();
        let (a1, mut rx_a1) = channel();
        let (b1, mut rx_b1) = channel();
        registry.register("a", a1);
        registry.register("b", b1);

        registry.send_to_user("a", &start());

        assert_eq!(text(&mut rx_a1)["wait"], 3);
        assert!(rx_b1.try_recv().is_err());
    }

    #[test]
    fn closed_channel_is_pruned_without_affecting_others() {
        let mut registry = ConnectionRegistry::default();
        let (a1, rx_a1) = channel();
        let (a2, mut rx_a2) = channel();
        let (b1, mut rx_b1) = channel();
        registry.register("a", a1);
        registry.register("a", a2);
        registry.register("b", b1);
        drop(rx_a1);

        registry.broadcast(&start());

        assert_eq!(registry.connection_count(), 2);
        assert_eq!(text(&mut rx_a2)["type"], "game_start");
        assert_eq!(text(&mut rx_b1)["type"], "game_start");
    }

    #[test]
    fn deregister_removes_only_that_tab() {
        let mut registry = ConnectionRegistry::default();
        let (a1, _rx_a1) = channel();
        let (a2, mut rx_a2) = channel();
        let a1_id = a1.id;
        registry.register("a", a1);
        registry.register("a", a2);

        registry.deregister("a", a1_id);
        registry.send_to_user("a", &start());

        assert_eq!(registry.connection_count(), 1);
        assert_eq!(text(&mut rx_a2)["type"], "game_start");
    }

    #[test]
    fn remove_user_drops_all_tabs() {
        let mut registry = ConnectionRegistry::default();
        let (a1, mut rx_a1) = channel();
        let (a2, _rx_a2) = channel();
        registry.register("a", a1);
        registry.register("a", a2);

        registry.remove_user("a");

        assert_eq!(registry.connection_count(), 0);
        assert!(matches!(
            rx_a1.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
