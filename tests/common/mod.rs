#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures::StreamExt;
use serde_json::{Value, json};
use tap_rally_back::{
    build_router,
    config::{AppConfig, RoundTimings},
    dao::room_store::MemoryRoomStore,
    state::AppState,
};
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A server on an ephemeral port backed by the in-memory store.
pub struct TestServer {
    pub addr: SocketAddr,
    pub http: reqwest::Client,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::with_timings(RoundTimings {
            countdown: Duration::ZERO,
            duration: Duration::from_secs(2),
            grace: Duration::from_millis(300),
        })
        .await
    }

    pub async fn with_timings(timings: RoundTimings) -> Self {
        let state = AppState::new(
            AppConfig::new(timings, 16),
            Arc::new(MemoryRoomStore::new()),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let app = build_router(state);
        let task = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service())
                .await
                .expect("serve");
        });
        Self {
            addr,
            http: reqwest::Client::new(),
            task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Create a room and return `(status, body)`.
    pub async fn create_room(&self, creator: &str, max_users: usize, pass: &str) -> (u16, Value) {
        self.post(
            "/rooms",
            json!({
                "name": "Lunch break",
                "maxUsers": max_users,
                "creator": { "id": creator, "name": creator.to_uppercase() },
                "passphrase": pass,
            }),
        )
        .await
    }

    /// Create a room that must succeed and return its id.
    pub async fn room(&self, creator: &str, max_users: usize) -> String {
        let (status, body) = self.create_room(creator, max_users, "secret").await;
        assert_eq!(status, 200, "create failed: {body}");
        body["room"]["id"].as_str().expect("room id").to_string()
    }

    pub async fn join(&self, room_id: &str, user: &str, pass: &str) -> (u16, Value) {
        self.post(
            &format!("/rooms/{room_id}/join"),
            json!({
                "user": { "id": user, "name": user.to_uppercase() },
                "passphrase": pass,
            }),
        )
        .await
    }

    pub async fn start_round(&self, room_id: &str, user: &str) -> (u16, Value) {
        self.post(&format!("/rooms/{room_id}/start"), json!({ "userId": user }))
            .await
    }

    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let response = self
            .http
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("send request");
        read(response).await
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .expect("send request");
        read(response).await
    }

    pub async fn delete(&self, path: &str) -> (u16, Value) {
        let response = self
            .http
            .delete(self.url(path))
            .send()
            .await
            .expect("send request");
        read(response).await
    }

    pub async fn connect(&self, room_id: &str, user: &str) -> Socket {
        let url = format!("ws://{}/ws/{room_id}?userId={user}", self.addr);
        let (socket, _) = connect_async(url).await.expect("open websocket");
        socket
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn read(response: reqwest::Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let text = response.text().await.expect("read body");
    let body = serde_json::from_str(&text).unwrap_or(Value::Null);
    (status, body)
}

/// Read frames until one of type `kind` arrives, skipping the rest.
pub async fn next_of_type(socket: &mut Socket, kind: &str) -> Value {
    let wait = async {
        while let Some(frame) = socket.next().await {
            let frame = frame.expect("websocket frame");
            if let Message::Text(text) = frame {
                let value: Value = serde_json::from_str(text.as_str()).expect("json message");
                if value["type"] == kind {
                    return value;
                }
            }
        }
        panic!("socket closed before `{kind}` arrived");
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for `{kind}`"))
}
