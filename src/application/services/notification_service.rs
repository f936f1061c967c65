//! Notification Service
//!
//! Creates notifications (persist first, deliver second) and serves a user's
//! notification inbox.

use std::sync::Arc;

use crate::domain::{
    Event, EventPublisher, NewNotification, Notification, NotificationRepository, Principal,
};
use crate::shared::error::{AppError, RealtimeError};

/// Notification service over the storage collaborator and the delivery port
pub struct NotificationService {
    repository: Arc<dyn NotificationRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl NotificationService {
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// Persist a notification and deliver it to every session of its user.
    pub async fn create_notification(
        &self,
        input: NewNotification,
    ) -> Result<Notification, RealtimeError> {
        let notification = self
            .repository
            .persist_notification(&input)
            .await
            .map_err(|e| {
                tracing::warn!(user_id = input.user_id, error = %e, "Notification not persisted");
                RealtimeError::from(e)
            })?;

        let report = self.publisher.publish(Event::NotificationAdded {
            user_id: notification.user_id,
            notification: notification.clone(),
        });

        tracing::info!(
            notification_id = notification.id,
            user_id = notification.user_id,
            pushed = report.pushed,
            subscribers = report.subscribers,
            "Notification created"
        );

        Ok(notification)
    }

    /// Notifications of the principal, newest first.
    pub async fn my_notifications(
        &self,
        principal: &Principal,
    ) -> Result<Vec<Notification>, AppError> {
        self.repository
            .find_user_notifications(principal.user_id)
            .await
    }

    pub async fn unread_count(&self, principal: &Principal) -> Result<i64, AppError> {
        self.repository.unread_count(principal.user_id).await
    }

    /// Mark one of the principal's notifications as read.
    ///
    /// Someone else's notification is reported as not found.
    pub async fn mark_read(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<Notification, AppError> {
        match self.repository.find_by_id(id).await? {
            Some(n) if n.user_id == principal.user_id => self.repository.mark_as_read(id).await,
            _ => Err(AppError::NotFound("Notification not found".into())),
        }
    }
}
