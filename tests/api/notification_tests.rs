//! Notification API Tests

use axum::http::StatusCode;
use chat_realtime::domain::Role;
use chat_realtime::presentation::websocket::ServerFrame;

use crate::common::{drain, json_body, token_for, TestApp};

const MENTION: &str =
    r#"{"userId":7,"type":"mention","title":"Mentioned","message":"You were mentioned"}"#;

#[tokio::test]
async fn test_admin_notification_reaches_every_session() {
    let app = TestApp::new();
    let (_phone, mut phone_rx) = app.connect(7);
    let (_laptop, mut laptop_rx) = app.connect(7);
    let (_other, mut other_rx) = app.connect(8);

    let response = app
        .post_json_auth("/api/v1/notifications", MENTION, &token_for(1, Role::Admin))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    for rx in [&mut phone_rx, &mut laptop_rx] {
        let frames = drain(rx);
        assert_eq!(frames.len(), 1);
        assert!(matches!(
            &frames[0],
            ServerFrame::Notification { payload } if payload.user_id == 7
        ));
    }
    assert!(drain(&mut other_rx).is_empty());
}

#[tokio::test]
async fn test_user_cannot_notify_others() {
    let app = TestApp::new();

    let response = app
        .post_json_auth("/api/v1/notifications", MENTION, &token_for(1, Role::User))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unread_count_and_mark_read() {
    let app = TestApp::new();
    let token = token_for(7, Role::User);

    let created = json_body(
        app.post_json_auth(
            "/api/v1/notifications",
            r#"{"type":"info","title":"Hi","message":"Welcome"}"#,
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(created["userId"], 7);
    assert_eq!(created["read"], false);

    let count = json_body(app.get_auth("/api/v1/notifications/unread-count", &token).await).await;
    assert_eq!(count["count"], 1);

    let uri = format!("/api/v1/notifications/{}/read", created["id"]);
    let response = app.post_json_auth(&uri, "{}", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let count = json_body(app.get_auth("/api/v1/notifications/unread-count", &token).await).await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn test_cannot_mark_someone_elses_notification() {
    let app = TestApp::new();
    app.post_json_auth("/api/v1/notifications", MENTION, &token_for(1, Role::Admin))
        .await;

    let response = app
        .post_json_auth("/api/v1/notifications/1/read", "{}", &token_for(8, Role::User))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
