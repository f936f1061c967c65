//! Delivery Dispatcher
//!
//! Delivers every persisted event through both transports from one call site:
//!
//! 1. the registry sink pushes a frame to each matching gateway connection,
//! 2. the bridge sink publishes on the event's topic for subscription clients.
//!
//! Neither sink infers anything from the other; both run for every event.

use std::sync::Arc;

use super::messages::ServerFrame;
use super::registry::ConnectionRegistry;
use crate::domain::{
    ChatMessage, ConnectionHandle, DeliveryReport, Event, EventPublisher, Notification,
};
use crate::infrastructure::metrics;
use crate::infrastructure::pubsub::EventBridge;
use crate::shared::error::RealtimeError;

/// Fans events out to gateway connections and bridge subscribers
pub struct DeliveryDispatcher {
    registry: Arc<ConnectionRegistry>,
    bridge: EventBridge,
}

impl DeliveryDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>, bridge: EventBridge) -> Self {
        Self { registry, bridge }
    }

    /// A message was persisted in `room_id`.
    pub fn on_message_added(&self, room_id: i64, message: ChatMessage) -> DeliveryReport {
        self.dispatch(Event::MessageAdded { room_id, message })
    }

    /// A notification was persisted for `user_id`.
    pub fn on_notification_added(
        &self,
        user_id: i64,
        notification: Notification,
    ) -> DeliveryReport {
        self.dispatch(Event::NotificationAdded {
            user_id,
            notification,
        })
    }

    /// Deliver one event through both sinks.
    pub fn dispatch(&self, event: Event) -> DeliveryReport {
        let (pushed, dropped) = self.push_to_connections(&event);
        let subscribers = self.bridge.publish(event.topic(), event.clone());

        metrics::record_dispatch(event.kind(), pushed, dropped);
        tracing::debug!(
            kind = event.kind(),
            topic = %event.topic(),
            pushed = pushed,
            dropped = dropped,
            subscribers = subscribers,
            "Event dispatched"
        );

        DeliveryReport {
            pushed,
            dropped,
            subscribers,
        }
    }

    /// Registry sink. Returns `(pushed, dropped)`.
    fn push_to_connections(&self, event: &Event) -> (usize, usize) {
        let audience = match event {
            Event::MessageAdded { room_id, .. } => self.registry.connections_for(*room_id),
            Event::NotificationAdded { user_id, .. } => {
                self.registry.connections_for_user(*user_id)
            }
        };

        if audience.is_empty() {
            return (0, 0);
        }

        let frame = ServerFrame::from(event.to_push());
        let mut pushed = 0;
        let mut dropped = 0;

        for handle in audience {
            match self.registry.push(&handle, frame.clone()) {
                Ok(true) => pushed += 1,
                // Unregistered between snapshot and push.
                Ok(false) => {}
                Err(RealtimeError::TransportClosed) => {
                    self.drop_dead_connection(&handle);
                    dropped += 1;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %handle, error = %e, "Push failed");
                }
            }
        }

        (pushed, dropped)
    }

    fn drop_dead_connection(&self, handle: &ConnectionHandle) {
        tracing::warn!(connection_id = %handle, "Transport closed during push, unregistering");
        self.registry.unregister(handle);
    }
}

impl EventPublisher for DeliveryDispatcher {
    fn publish(&self, event: Event) -> DeliveryReport {
        self.dispatch(event)
    }
}
