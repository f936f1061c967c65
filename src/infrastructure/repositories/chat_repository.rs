//! Chat Repository Implementation
//!
//! PostgreSQL implementation of the ChatRepository trait. The
//! `chat_rooms.participant_ids` column is the membership authority.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ChatMessage, ChatRepository, ChatRoom};
use crate::shared::error::AppError;

/// Database row for the chat_rooms table.
#[derive(Debug, sqlx::FromRow)]
struct RoomRow {
    id: i64,
    name: String,
    participant_ids: Vec<i64>,
    created_at: DateTime<Utc>,
}

impl RoomRow {
    fn into_room(self) -> ChatRoom {
        ChatRoom {
            id: self.id,
            name: self.name,
            participant_ids: self.participant_ids,
            created_at: self.created_at,
        }
    }
}

/// Database row for the chat_messages table.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    room_id: i64,
    sender_id: i64,
    content: String,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            room_id: self.room_id,
            sender_id: self.sender_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL chat repository implementation.
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn persist_message(
        &self,
        room_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<ChatMessage, AppError> {
        ChatMessage::validate_content(content)?;

        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO chat_messages (room_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, room_id, sender_id, content, created_at
            "#,
        )
        .bind(room_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_foreign_key_violation() {
                    return AppError::NotFound(format!("Room {} not found", room_id));
                }
            }
            AppError::Database(e)
        })?;

        Ok(row.into_message())
    }

    async fn is_room_member(&self, user_id: i64, room_id: i64) -> Result<bool, AppError> {
        let is_member: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM chat_rooms
                WHERE id = $1 AND $2 = ANY(participant_ids)
            )
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(is_member)
    }

    async fn create_room(&self, name: &str, participant_ids: &[i64]) -> Result<ChatRoom, AppError> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            INSERT INTO chat_rooms (name, participant_ids)
            VALUES ($1, $2)
            RETURNING id, name, participant_ids, created_at
            "#,
        )
        .bind(name)
        .bind(participant_ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_room())
    }

    async fn find_user_rooms(&self, user_id: i64) -> Result<Vec<ChatRoom>, AppError> {
        let rows = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT id, name, participant_ids, created_at
            FROM chat_rooms
            WHERE $1 = ANY(participant_ids)
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_room()).collect())
    }

    async fn room_messages(&self, room_id: i64) -> Result<Vec<ChatMessage>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, room_id, sender_id, content, created_at
            FROM chat_messages
            WHERE room_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
