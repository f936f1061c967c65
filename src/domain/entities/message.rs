//! Chat message entity.
//!
//! Maps to the `chat_messages` table in the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Maximum message length in characters, enforced by storage.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// A persisted chat message.
///
/// Maps to the `chat_messages` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - room_id: BIGINT NOT NULL REFERENCES chat_rooms(id)
/// - sender_id: BIGINT NOT NULL
/// - content: VARCHAR(2000) NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Content rules applied before a message is stored.
    pub fn validate_content(content: &str) -> Result<(), AppError> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("content: must not be empty".into()));
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(AppError::Validation(format!(
                "content: must be at most {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }
        Ok(())
    }
}
