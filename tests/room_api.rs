mod common;

use common::TestServer;
use serde_json::json;

#[tokio::test]
async fn create_returns_room_and_channel_path() {
    let server = TestServer::start().await;
    let (status, body) = server.create_room("alice", 4, "secret").await;
    assert_eq!(status, 200);

    let room_id = body["room"]["id"].as_str().unwrap();
    assert_eq!(body["room"]["creatorId"], "alice");
    assert_eq!(body["room"]["maxUsers"], 4);
    assert_eq!(body["room"]["phase"], "lobby");
    assert_eq!(body["room"]["members"].as_array().unwrap().len(), 1);
    assert_eq!(body["user"]["id"], "alice");
    assert_eq!(body["wsPath"], format!("/ws/{room_id}?userId=alice"));
    assert!(body["room"].get("passphrase").is_none());
}

#[tokio::test]
async fn create_rejects_invalid_payloads() {
    let server = TestServer::start().await;
    assert_eq!(server.create_room("alice", 1, "secret").await.0, 400);
    assert_eq!(server.create_room("alice", 11, "secret").await.0, 400);
    assert_eq!(server.create_room("alice", 4, "").await.0, 400);
    assert_eq!(server.create_room("a b", 4, "secret").await.0, 400);

    let (status, _) = server
        .post(
            "/rooms",
            json!({
                "name": "   ",
                "maxUsers": 4,
                "creator": { "id": "alice", "name": "Alice" },
                "passphrase": "secret",
            }),
        )
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn join_enforces_passphrase_duplicates_and_capacity() {
    let server = TestServer::start().await;
    let room_id = server.room("alice", 2).await;

    let (status, body) = server.join(&room_id, "bob", "wrong").await;
    assert_eq!(status, 403);
    assert!(body["message"].is_string());

    assert_eq!(server.join(&room_id, "alice", "secret").await.0, 400);

    let (status, body) = server.join(&room_id, "bob", "secret").await;
    assert_eq!(status, 200);
    assert_eq!(body["room"]["members"].as_array().unwrap().len(), 2);
    assert_eq!(body["wsPath"], format!("/ws/{room_id}?userId=bob"));

    assert_eq!(server.join(&room_id, "carol", "secret").await.0, 400);
}

#[tokio::test]
async fn unknown_room_is_not_found() {
    let server = TestServer::start().await;
    assert_eq!(server.get("/rooms/nope").await.0, 404);
    assert_eq!(server.join("nope", "bob", "secret").await.0, 404);
    assert_eq!(server.start_round("nope", "bob").await.0, 404);
    assert_eq!(server.delete("/rooms/nope/users/bob").await.0, 404);
}

#[tokio::test]
async fn only_the_creator_starts_a_round() {
    let server = TestServer::start().await;
    let room_id = server.room("alice", 3).await;
    server.join(&room_id, "bob", "secret").await;

    assert_eq!(server.start_round(&room_id, "bob").await.0, 403);

    let (status, body) = server.start_round(&room_id, "alice").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let (_, body) = server.get(&format!("/rooms/{room_id}")).await;
    assert_eq!(body["room"]["phase"], "playing");

    assert_eq!(server.start_round(&room_id, "alice").await.0, 400);
    assert_eq!(server.join(&room_id, "carol", "secret").await.0, 400);
}

#[tokio::test]
async fn scores_require_an_active_round_and_a_member() {
    let server = TestServer::start().await;
    let room_id = server.room("alice", 3).await;
    server.join(&room_id, "bob", "secret").await;

    let path = format!("/rooms/{room_id}/result");
    let (status, _) = server
        .post(&path, json!({ "userId": "alice", "tapCount": 4 }))
        .await;
    assert_eq!(status, 400);

    server.start_round(&room_id, "alice").await;
    let (status, _) = server
        .post(&path, json!({ "userId": "zed", "tapCount": 4 }))
        .await;
    assert_eq!(status, 404);

    let (status, body) = server
        .post(
            &format!("/rooms/{room_id}/click"),
            json!({ "userId": "alice", "tapCount": 4 }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn leave_reassigns_creator_and_deletes_empty_rooms() {
    let server = TestServer::start().await;
    let room_id = server.room("alice", 3).await;
    server.join(&room_id, "bob", "secret").await;

    let (status, _) = server
        .delete(&format!("/rooms/{room_id}/users/alice"))
        .await;
    assert_eq!(status, 200);
    let (_, body) = server.get(&format!("/rooms/{room_id}")).await;
    assert_eq!(body["room"]["creatorId"], "bob");

    let (status, _) = server
        .delete(&format!("/rooms/{room_id}/users/alice"))
        .await;
    assert_eq!(status, 200, "leaving twice is a no-op");

    server.delete(&format!("/rooms/{room_id}/users/bob")).await;
    assert_eq!(server.get(&format!("/rooms/{room_id}")).await.0, 404);
}

#[tokio::test]
async fn list_shows_live_rooms() {
    let server = TestServer::start().await;
    let first = server.room("alice", 2).await;
    let second = server.room("bob", 2).await;

    let (status, body) = server.get("/rooms").await;
    assert_eq!(status, 200);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|room| room["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.as_str()));
    assert!(ids.contains(&second.as_str()));
}

#[tokio::test]
async fn healthcheck_reports_ok_with_memory_store() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/healthcheck").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/api-doc/openapi.json").await;
    assert_eq!(status, 200);
    assert!(body["paths"]["/rooms"].is_object());
}
