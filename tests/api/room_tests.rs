//! Room and Message API Tests

use axum::http::StatusCode;
use chat_realtime::domain::Role;
use chat_realtime::presentation::websocket::ServerFrame;

use crate::common::{
    drain, expired_token_for, json_body, token_for, InMemoryChatRepository, TestApp,
};

#[tokio::test]
async fn test_rooms_require_authentication() {
    let app = TestApp::new();

    let response = app.get("/api/v1/rooms").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get_auth("/api/v1/rooms", &expired_token_for(1)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_room_adds_creator() {
    let app = TestApp::new();
    let token = token_for(9, Role::User);

    let response = app
        .post_json_auth("/api/v1/rooms", r#"{"name":"general","participantIds":[2,3]}"#, &token)
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = json_body(response).await;
    assert_eq!(json["name"], "general");
    assert_eq!(json["participantIds"], serde_json::json!([2, 3, 9]));

    let rooms = json_body(app.get_auth("/api/v1/rooms", &token).await).await;
    assert_eq!(rooms.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_create_room_validates_name() {
    let app = TestApp::new();

    let response = app
        .post_json_auth("/api/v1/rooms", r#"{"name":""}"#, &token_for(1, Role::User))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_http_send_is_pushed_to_joined_connections() {
    let app = TestApp::with_chat(InMemoryChatRepository::default().with_room(5, &[1, 2]));
    let (bob, mut bob_rx) = app.connect(2);
    app.state.membership.join(&bob, 5).await.unwrap();

    let response = app
        .post_json_auth(
            "/api/v1/rooms/5/messages",
            r#"{"content":"hello"}"#,
            &token_for(1, Role::User),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let frames = drain(&mut bob_rx);
    assert_eq!(frames.len(), 1);
    assert!(matches!(&frames[0], ServerFrame::Message { payload } if payload.content == "hello"));
}

#[tokio::test]
async fn test_non_member_cannot_read_or_send() {
    let app = TestApp::with_chat(InMemoryChatRepository::default().with_room(5, &[1, 2]));
    let outsider = token_for(3, Role::User);

    let response = app.get_auth("/api/v1/rooms/5/messages", &outsider).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_json_auth("/api/v1/rooms/5/messages", r#"{"content":"hi"}"#, &outsider)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.chat.message_count(), 0);
}

#[tokio::test]
async fn test_message_history_in_order() {
    let app = TestApp::with_chat(InMemoryChatRepository::default().with_room(5, &[1]));
    let token = token_for(1, Role::User);

    for content in ["one", "two"] {
        let body = serde_json::json!({ "content": content }).to_string();
        app.post_json_auth("/api/v1/rooms/5/messages", &body, &token).await;
    }

    let history = json_body(app.get_auth("/api/v1/rooms/5/messages", &token).await).await;
    assert_eq!(history[0]["content"], "one");
    assert_eq!(history[1]["content"], "two");
}

#[tokio::test]
async fn test_invalid_room_id() {
    let app = TestApp::new();

    let response = app
        .get_auth("/api/v1/rooms/abc/messages", &token_for(1, Role::User))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
