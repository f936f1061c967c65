//! Realtime events.
//!
//! An [`Event`] is created by a service after a domain action has been
//! persisted and handed to the delivery layer. Events are immutable and carry
//! no identity beyond their payload; delivery is fire-and-forget.

use serde::Serialize;

use super::message::ChatMessage;
use super::notification::Notification;
use crate::domain::value_objects::Topic;

/// A published domain event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A message was persisted in a room
    MessageAdded { room_id: i64, message: ChatMessage },
    /// A notification was persisted for a user
    NotificationAdded { user_id: i64, notification: Notification },
}

impl Event {
    /// The topic this event is routed on.
    pub fn topic(&self) -> Topic {
        match self {
            Event::MessageAdded { room_id, .. } => Topic::Room(*room_id),
            Event::NotificationAdded { user_id, .. } => Topic::User(*user_id),
        }
    }

    /// Short kind label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::MessageAdded { .. } => "message",
            Event::NotificationAdded { .. } => "notification",
        }
    }

    /// Outbound payload as seen by clients on either transport.
    pub fn to_push(&self) -> PushPayload {
        match self {
            Event::MessageAdded { message, .. } => PushPayload::Message(message.clone()),
            Event::NotificationAdded { notification, .. } => {
                PushPayload::Notification(notification.clone())
            }
        }
    }
}

/// Client-facing push body: `{"type": "message" | "notification", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum PushPayload {
    Message(ChatMessage),
    Notification(Notification),
}
