//! Room Membership Manager
//!
//! Authorises join requests against the membership authority (storage) before
//! touching the registry, so a connection's room set only ever contains rooms
//! its principal is a persisted participant of.

use std::sync::Arc;

use super::registry::ConnectionRegistry;
use crate::domain::{ChatRepository, ConnectionHandle, Principal};
use crate::shared::error::RealtimeError;

/// Join/leave orchestration over the registry and the membership authority
pub struct MembershipManager {
    registry: Arc<ConnectionRegistry>,
    authority: Arc<dyn ChatRepository>,
}

impl MembershipManager {
    pub fn new(registry: Arc<ConnectionRegistry>, authority: Arc<dyn ChatRepository>) -> Self {
        Self {
            registry,
            authority,
        }
    }

    /// Check that a principal may receive events of a room.
    pub async fn authorize_room(
        &self,
        principal: &Principal,
        room_id: i64,
    ) -> Result<(), RealtimeError> {
        let is_member = self
            .authority
            .is_room_member(principal.user_id, room_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    user_id = principal.user_id,
                    room_id = room_id,
                    error = %e,
                    "Membership lookup failed"
                );
                RealtimeError::from(e)
            })?;

        if is_member {
            Ok(())
        } else {
            Err(RealtimeError::NotAMember { room_id })
        }
    }

    /// Join a room on behalf of a registered connection.
    ///
    /// A rejected join leaves the connection's room set untouched. If the
    /// connection disconnects while the authority is consulted, the join fails
    /// with `NotAuthenticated` instead of resurrecting it.
    pub async fn join(&self, handle: &ConnectionHandle, room_id: i64) -> Result<(), RealtimeError> {
        let principal = self
            .registry
            .principal_for(handle)
            .ok_or(RealtimeError::NotAuthenticated)?;

        self.authorize_room(&principal, room_id).await?;
        self.registry.join_room(handle, room_id)?;

        tracing::debug!(
            connection_id = %handle,
            user_id = principal.user_id,
            room_id = room_id,
            "Joined room"
        );
        Ok(())
    }

    /// Leave a room. Idempotent, including for unknown handles.
    pub fn leave(&self, handle: &ConnectionHandle, room_id: i64) {
        self.registry.leave_room(handle, room_id);
        tracing::debug!(connection_id = %handle, room_id = room_id, "Left room");
    }
}
