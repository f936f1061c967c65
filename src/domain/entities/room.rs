//! Chat room entity and repository trait.
//!
//! Maps to the `chat_rooms` table. The authoritative room membership list is
//! the `participant_ids` column; the realtime layer only ever asks
//! [`ChatRepository::is_room_member`] and never caches the answer beyond a
//! single join.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::ChatMessage;
use crate::shared::error::AppError;

/// A chat room.
///
/// Maps to the `chat_rooms` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - name: VARCHAR(100) NOT NULL
/// - participant_ids: BIGINT[] NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    pub id: i64,
    pub name: String,
    pub participant_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl ChatRoom {
    /// Check whether a user is listed as a participant.
    pub fn has_participant(&self, user_id: i64) -> bool {
        self.participant_ids.contains(&user_id)
    }
}

/// Repository trait for chat rooms, messages and the membership authority.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Persist a message and return it with its assigned id and timestamp.
    ///
    /// Content rules (non-empty, length limit) are enforced here.
    async fn persist_message(
        &self,
        room_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<ChatMessage, AppError>;

    /// Membership authority: is `user_id` a persisted participant of `room_id`?
    async fn is_room_member(&self, user_id: i64, room_id: i64) -> Result<bool, AppError>;

    /// Create a new room.
    async fn create_room(&self, name: &str, participant_ids: &[i64]) -> Result<ChatRoom, AppError>;

    /// Rooms the user participates in.
    async fn find_user_rooms(&self, user_id: i64) -> Result<Vec<ChatRoom>, AppError>;

    /// Messages of a room, oldest first.
    async fn room_messages(&self, room_id: i64) -> Result<Vec<ChatMessage>, AppError>;

    /// Cheap round-trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
