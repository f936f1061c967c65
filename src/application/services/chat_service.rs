//! Chat Service
//!
//! Room and message operations. Sending a message persists it first and only
//! then hands the stored message to the delivery layer; a storage failure
//! short-circuits before anything is delivered.

use std::sync::Arc;

use crate::domain::{ChatMessage, ChatRepository, ChatRoom, Event, EventPublisher, Principal};
use crate::shared::error::{AppError, RealtimeError};

/// Chat service over the storage collaborator and the delivery port
pub struct ChatService {
    repository: Arc<dyn ChatRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl ChatService {
    pub fn new(repository: Arc<dyn ChatRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// Persist a message from `principal` and deliver it to the room.
    ///
    /// The sender must be a persisted participant of the room. Content is
    /// passed through untouched; storage enforces its rules.
    pub async fn send_message(
        &self,
        principal: &Principal,
        room_id: i64,
        content: &str,
    ) -> Result<ChatMessage, RealtimeError> {
        if !self
            .repository
            .is_room_member(principal.user_id, room_id)
            .await?
        {
            return Err(RealtimeError::NotAMember { room_id });
        }

        let message = self
            .repository
            .persist_message(room_id, principal.user_id, content)
            .await
            .map_err(|e| {
                tracing::warn!(
                    user_id = principal.user_id,
                    room_id = room_id,
                    error = %e,
                    "Message not persisted"
                );
                RealtimeError::from(e)
            })?;

        let report = self.publisher.publish(Event::MessageAdded {
            room_id,
            message: message.clone(),
        });

        tracing::info!(
            message_id = message.id,
            room_id = room_id,
            sender_id = principal.user_id,
            pushed = report.pushed,
            subscribers = report.subscribers,
            "Message sent"
        );

        Ok(message)
    }

    /// Create a room. The creator is always a participant.
    pub async fn create_room(
        &self,
        principal: &Principal,
        name: &str,
        participant_ids: &[i64],
    ) -> Result<ChatRoom, AppError> {
        let mut participants: Vec<i64> = participant_ids.to_vec();
        if !participants.contains(&principal.user_id) {
            participants.push(principal.user_id);
        }
        participants.sort_unstable();
        participants.dedup();

        let room = self.repository.create_room(name, &participants).await?;
        tracing::info!(room_id = room.id, creator_id = principal.user_id, "Room created");
        Ok(room)
    }

    /// Rooms the principal participates in.
    pub async fn my_rooms(&self, principal: &Principal) -> Result<Vec<ChatRoom>, AppError> {
        self.repository.find_user_rooms(principal.user_id).await
    }

    /// Message history of a room, oldest first. Participants only.
    pub async fn room_messages(
        &self,
        principal: &Principal,
        room_id: i64,
    ) -> Result<Vec<ChatMessage>, AppError> {
        if !self
            .repository
            .is_room_member(principal.user_id, room_id)
            .await?
        {
            return Err(RealtimeError::NotAMember { room_id }.into());
        }
        self.repository.room_messages(room_id).await
    }
}
