//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure. Storage is replaced by
//! in-memory repositories so the full router and delivery core run without a
//! database.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceExt;

use chat_realtime::application::services::{Claims, Subject};
use chat_realtime::config::{
    BridgeSettings, CorsSettings, DatabaseSettings, JwtSettings, ServerSettings, Settings,
    TelemetrySettings, WebSocketSettings,
};
use chat_realtime::domain::{
    ChatMessage, ChatRepository, ChatRoom, ConnectionHandle, NewNotification, Notification,
    NotificationRepository, Principal, Role,
};
use chat_realtime::presentation::http::create_router;
use chat_realtime::presentation::websocket::ServerFrame;
use chat_realtime::shared::error::AppError;
use chat_realtime::startup::AppState;

pub const TEST_SECRET: &str = "integration-test-secret-with-32-bytes!!";

/// Settings for tests; nothing is read from the environment.
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "postgres://localhost/unused".into(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: 1,
            run_migrations: false,
        },
        jwt: JwtSettings {
            secret: TEST_SECRET.into(),
            leeway_secs: 0,
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        websocket: WebSocketSettings {
            max_message_size: 65536,
            max_frame_size: 16384,
            idle_timeout_secs: 90,
            heartbeat_check_secs: 15,
        },
        bridge: BridgeSettings {
            channel_capacity: 64,
        },
        telemetry: TelemetrySettings { json: false },
        environment: "test".into(),
    }
}

/// Sign a token the way the external identity service would.
pub fn token_for(user_id: i64, role: Role) -> String {
    let claims = Claims {
        sub: Subject::Text(user_id.to_string()),
        role,
        exp: Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn expired_token_for(user_id: i64) -> String {
    let claims = Claims {
        sub: Subject::Numeric(user_id),
        role: Role::User,
        exp: Utc::now().timestamp() - 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

/// In-memory chat storage
#[derive(Default)]
pub struct InMemoryChatRepository {
    rooms: Mutex<Vec<ChatRoom>>,
    messages: Mutex<Vec<ChatMessage>>,
    pub fail_writes: Mutex<bool>,
}

impl InMemoryChatRepository {
    pub fn with_room(self, id: i64, participants: &[i64]) -> Self {
        self.rooms.lock().push(ChatRoom {
            id,
            name: format!("room-{}", id),
            participant_ids: participants.to_vec(),
            created_at: Utc::now(),
        });
        self
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().len()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn persist_message(
        &self,
        room_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<ChatMessage, AppError> {
        if *self.fail_writes.lock() {
            return Err(AppError::Internal("storage unavailable".into()));
        }
        ChatMessage::validate_content(content)?;

        let mut messages = self.messages.lock();
        let message = ChatMessage {
            id: messages.len() as i64 + 1,
            room_id,
            sender_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        messages.push(message.clone());
        Ok(message)
    }

    async fn is_room_member(&self, user_id: i64, room_id: i64) -> Result<bool, AppError> {
        Ok(self
            .rooms
            .lock()
            .iter()
            .any(|r| r.id == room_id && r.has_participant(user_id)))
    }

    async fn create_room(&self, name: &str, participant_ids: &[i64]) -> Result<ChatRoom, AppError> {
        let mut rooms = self.rooms.lock();
        let room = ChatRoom {
            id: rooms.iter().map(|r| r.id).max().unwrap_or(0) + 1,
            name: name.to_string(),
            participant_ids: participant_ids.to_vec(),
            created_at: Utc::now(),
        };
        rooms.push(room.clone());
        Ok(room)
    }

    async fn find_user_rooms(&self, user_id: i64) -> Result<Vec<ChatRoom>, AppError> {
        Ok(self
            .rooms
            .lock()
            .iter()
            .filter(|r| r.has_participant(user_id))
            .cloned()
            .collect())
    }

    async fn room_messages(&self, room_id: i64) -> Result<Vec<ChatMessage>, AppError> {
        Ok(self
            .messages
            .lock()
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// In-memory notification storage
#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn persist_notification(
        &self,
        input: &NewNotification,
    ) -> Result<Notification, AppError> {
        let mut notifications = self.notifications.lock();
        let notification = Notification {
            id: notifications.len() as i64 + 1,
            user_id: input.user_id,
            kind: input.kind.clone(),
            title: input.title.clone(),
            message: input.message.clone(),
            read: false,
            created_at: Utc::now(),
        };
        notifications.push(notification.clone());
        Ok(notification)
    }

    async fn find_user_notifications(&self, user_id: i64) -> Result<Vec<Notification>, AppError> {
        Ok(self
            .notifications
            .lock()
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, AppError> {
        Ok(self.notifications.lock().iter().find(|n| n.id == id).cloned())
    }

    async fn mark_as_read(&self, id: i64) -> Result<Notification, AppError> {
        let mut notifications = self.notifications.lock();
        let notification = notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::NotFound("Notification not found".into()))?;
        notification.read = true;
        Ok(notification.clone())
    }

    async fn unread_count(&self, user_id: i64) -> Result<i64, AppError> {
        Ok(self
            .notifications
            .lock()
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }
}

/// Test application builder
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub chat: Arc<InMemoryChatRepository>,
}

impl TestApp {
    /// Create a new test application over in-memory storage
    pub fn new() -> Self {
        Self::with_chat(InMemoryChatRepository::default())
    }

    pub fn with_chat(chat: InMemoryChatRepository) -> Self {
        Self::with_settings(test_settings(), chat)
    }

    pub fn with_settings(settings: Settings, chat: InMemoryChatRepository) -> Self {
        let chat = Arc::new(chat);
        let state = AppState::new(
            settings,
            chat.clone(),
            Arc::new(InMemoryNotificationRepository::default()),
        );
        Self {
            router: create_router(state.clone()),
            state,
            chat,
        }
    }

    /// Serve the router on an ephemeral local port.
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router.clone();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        addr
    }

    /// Register a live connection the way the gateway does after handshake.
    pub fn connect(
        &self,
        user_id: i64,
    ) -> (ConnectionHandle, mpsc::UnboundedReceiver<ServerFrame>) {
        let handle = ConnectionHandle::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.state
            .registry
            .register(handle, Principal::user(user_id), tx)
            .unwrap();
        (handle, rx)
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> Response {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated GET request
    pub async fn get_auth(&self, uri: &str, token: &str) -> Response {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post_json_auth(&self, uri: &str, body: &str, token: &str) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

/// Read a response body as JSON
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Drain every frame currently queued for a connection.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<ServerFrame>) -> Vec<ServerFrame> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}

/// Poll `check` until it holds, failing after five seconds.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..500 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 5s");
}
