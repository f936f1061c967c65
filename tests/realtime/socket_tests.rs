//! Socket Lifecycle Tests
//!
//! Real WebSocket clients against the served router: handshake rejection,
//! disconnect and idle cleanup, and subscription release.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message},
    MaybeTlsStream, WebSocketStream,
};

use chat_realtime::domain::{NewNotification, Role, Topic};

use crate::common::{
    eventually, expired_token_for, test_settings, token_for, InMemoryChatRepository, TestApp,
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn open(addr: SocketAddr, path: &str, token: &str) -> Client {
    let (ws, _) = connect_async(format!("ws://{}{}?token={}", addr, path, token))
        .await
        .unwrap();
    ws
}

/// Upgrade status code, or 101 when the upgrade was accepted.
async fn upgrade_status(url: String) -> u16 {
    match connect_async(url).await {
        Ok(_) => 101,
        Err(WsError::Http(response)) => response.status().as_u16(),
        Err(e) => panic!("unexpected handshake error: {}", e),
    }
}

async fn send_json(ws: &mut Client, value: Value) {
    ws.send(Message::text(value.to_string())).await.unwrap();
}

async fn next_json(ws: &mut Client) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("no frame within 2s")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Read until the server ends the socket.
async fn closed_by_server(ws: &mut Client) -> bool {
    let read_to_end = async {
        while let Some(msg) = ws.next().await {
            if matches!(msg, Ok(Message::Close(_)) | Err(_)) {
                break;
            }
        }
    };
    timeout(Duration::from_secs(5), read_to_end).await.is_ok()
}

#[tokio::test]
async fn test_upgrade_without_credential_is_rejected() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;

    assert_eq!(upgrade_status(format!("ws://{}/gateway", addr)).await, 401);
    assert_eq!(upgrade_status(format!("ws://{}/subscriptions", addr)).await, 401);
    assert_eq!(
        upgrade_status(format!("ws://{}/gateway?token={}", addr, expired_token_for(1))).await,
        401
    );
    assert_eq!(app.state.registry.connection_count(), 0);
}

#[tokio::test]
async fn test_gateway_close_unregisters_connection() {
    let app = TestApp::with_chat(InMemoryChatRepository::default().with_room(1, &[1]));
    let addr = app.spawn_server().await;
    let mut ws = open(addr, "/gateway", &token_for(1, Role::User)).await;

    let ready = next_json(&mut ws).await;
    assert_eq!(ready["type"], "ready");
    assert_eq!(ready["userId"], 1);
    assert_eq!(app.state.registry.connection_count(), 1);

    send_json(&mut ws, json!({ "command": "join", "roomId": 1 })).await;
    assert_eq!(next_json(&mut ws).await, json!({ "type": "joined", "roomId": 1 }));
    assert_eq!(app.state.registry.connections_for(1).len(), 1);

    ws.close(None).await.unwrap();

    eventually(|| app.state.registry.connection_count() == 0).await;
    assert!(app.state.registry.connections_for(1).is_empty());
    assert_eq!(app.state.registry.room_count(), 0);
}

#[tokio::test]
async fn test_dropped_transport_unregisters_connection() {
    let app = TestApp::with_chat(InMemoryChatRepository::default().with_room(1, &[1]));
    let addr = app.spawn_server().await;
    let mut ws = open(addr, "/gateway", &token_for(1, Role::User)).await;
    next_json(&mut ws).await;
    send_json(&mut ws, json!({ "command": "join", "roomId": 1 })).await;
    next_json(&mut ws).await;

    // No close handshake, the TCP stream just goes away.
    drop(ws);

    eventually(|| app.state.registry.connection_count() == 0).await;
    assert!(app.state.registry.connections_for(1).is_empty());
}

#[tokio::test]
async fn test_idle_gateway_connection_is_closed() {
    let mut settings = test_settings();
    settings.websocket.idle_timeout_secs = 1;
    settings.websocket.heartbeat_check_secs = 1;
    let app = TestApp::with_settings(settings, InMemoryChatRepository::default());
    let addr = app.spawn_server().await;
    let mut ws = open(addr, "/gateway", &token_for(1, Role::User)).await;
    next_json(&mut ws).await;
    assert_eq!(app.state.registry.connection_count(), 1);

    assert!(closed_by_server(&mut ws).await);
    eventually(|| app.state.registry.connection_count() == 0).await;
}

#[tokio::test]
async fn test_subscription_socket_lifecycle() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let mut ws = open(addr, "/subscriptions", &token_for(7, Role::User)).await;

    send_json(
        &mut ws,
        json!({ "type": "subscribe", "id": "n", "event": "notificationAdded" }),
    )
    .await;
    send_json(&mut ws, json!({ "type": "ping" })).await;
    assert_eq!(next_json(&mut ws).await, json!({ "type": "pong" }));
    assert_eq!(app.state.bridge.subscriber_count(Topic::User(7)), 1);
    // Subscription clients are not gateway connections.
    assert_eq!(app.state.registry.connection_count(), 0);

    app.state
        .notifications
        .create_notification(NewNotification {
            user_id: 7,
            kind: "info".into(),
            title: "Hello".into(),
            message: "Over the bridge".into(),
        })
        .await
        .unwrap();

    let next = next_json(&mut ws).await;
    assert_eq!(next["type"], "next");
    assert_eq!(next["id"], "n");
    assert_eq!(next["payload"]["type"], "notification");
    assert_eq!(next["payload"]["payload"]["title"], "Hello");

    ws.close(None).await.unwrap();
    eventually(|| app.state.bridge.topic_count() == 0).await;
}

#[tokio::test]
async fn test_complete_over_socket_releases_subscription() {
    let app = TestApp::with_chat(InMemoryChatRepository::default().with_room(3, &[7]));
    let addr = app.spawn_server().await;
    let mut ws = open(addr, "/subscriptions", &token_for(7, Role::User)).await;

    send_json(
        &mut ws,
        json!({ "type": "subscribe", "id": "r", "event": "messageAdded", "roomId": 3 }),
    )
    .await;
    send_json(&mut ws, json!({ "type": "ping" })).await;
    assert_eq!(next_json(&mut ws).await, json!({ "type": "pong" }));
    assert_eq!(app.state.bridge.subscriber_count(Topic::Room(3)), 1);

    send_json(&mut ws, json!({ "type": "complete", "id": "r" })).await;
    assert_eq!(next_json(&mut ws).await, json!({ "type": "complete", "id": "r" }));

    // `complete` is acknowledged only after the subscription is dropped.
    assert_eq!(app.state.bridge.subscriber_count(Topic::Room(3)), 0);
    assert_eq!(app.state.bridge.topic_count(), 0);
}
