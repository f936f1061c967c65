//! WebSocket Message Types
//!
//! JSON text frames of the gateway socket (`/gateway`) and the subscription
//! socket (`/subscriptions`).

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, Notification, PushPayload};
use crate::shared::error::RealtimeError;

/// Incoming gateway command
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum ClientCommand {
    /// Join a room
    Join {
        #[serde(rename = "roomId")]
        room_id: i64,
    },
    /// Leave a room
    Leave {
        #[serde(rename = "roomId")]
        room_id: i64,
    },
    /// Send a message to a room
    Send {
        #[serde(rename = "roomId")]
        room_id: i64,
        content: String,
    },
    /// Keep-alive
    Ping,
}

impl ClientCommand {
    /// Decode a text frame.
    pub fn parse(text: &str) -> Result<Self, RealtimeError> {
        serde_json::from_str(text).map_err(|e| RealtimeError::InvalidFrame(e.to_string()))
    }
}

/// Outgoing gateway frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Sent once after a successful handshake
    Ready {
        #[serde(rename = "connectionId")]
        connection_id: String,
        #[serde(rename = "userId")]
        user_id: i64,
    },
    /// A message pushed to a joined room
    Message { payload: ChatMessage },
    /// A notification pushed to the principal
    Notification { payload: Notification },
    /// Join acknowledged
    Joined {
        #[serde(rename = "roomId")]
        room_id: i64,
    },
    /// Leave acknowledged
    Left {
        #[serde(rename = "roomId")]
        room_id: i64,
    },
    /// Send acknowledged after persistence
    Sent {
        #[serde(rename = "roomId")]
        room_id: i64,
        #[serde(rename = "messageId")]
        message_id: i64,
    },
    Pong,
    /// Command rejected
    Error { code: String, message: String },
}

impl ServerFrame {
    pub fn error(err: &RealtimeError) -> Self {
        ServerFrame::Error {
            code: err.code().to_string(),
            message: err.client_message(),
        }
    }
}

impl From<PushPayload> for ServerFrame {
    fn from(push: PushPayload) -> Self {
        match push {
            PushPayload::Message(payload) => ServerFrame::Message { payload },
            PushPayload::Notification(payload) => ServerFrame::Notification { payload },
        }
    }
}

/// Events a subscription client can listen to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubscriptionEvent {
    /// Messages of one room, requires `roomId`
    MessageAdded,
    /// Notifications of the authenticated user
    NotificationAdded,
}

/// Incoming subscription socket frame
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SubscriptionRequest {
    Subscribe {
        id: String,
        event: SubscriptionEvent,
        #[serde(rename = "roomId", default)]
        room_id: Option<i64>,
    },
    Complete {
        id: String,
    },
    Ping,
}

impl SubscriptionRequest {
    /// Decode a text frame.
    pub fn parse(text: &str) -> Result<Self, RealtimeError> {
        serde_json::from_str(text).map_err(|e| RealtimeError::InvalidFrame(e.to_string()))
    }
}

/// Outgoing subscription socket frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SubscriptionFrame {
    /// One event for subscription `id`
    Next { id: String, payload: PushPayload },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        code: String,
        message: String,
    },
    /// Subscription `id` has ended
    Complete { id: String },
    Pong,
}

impl SubscriptionFrame {
    pub fn error(id: Option<String>, err: &RealtimeError) -> Self {
        SubscriptionFrame::Error {
            id,
            code: err.code().to_string(),
            message: err.client_message(),
        }
    }
}
