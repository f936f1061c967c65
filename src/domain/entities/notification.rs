//! Notification entity and repository trait.
//!
//! Maps to the `notifications` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A persisted user notification.
///
/// Maps to the `notifications` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - user_id: BIGINT NOT NULL
/// - type: VARCHAR(50) NOT NULL
/// - title: VARCHAR(200) NOT NULL
/// - message: TEXT NOT NULL
/// - read: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: i64,
    pub kind: String,
    pub title: String,
    pub message: String,
}

/// Repository trait for notification data access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persist a new (unread) notification.
    async fn persist_notification(&self, input: &NewNotification) -> Result<Notification, AppError>;

    /// Notifications of a user, newest first.
    async fn find_user_notifications(&self, user_id: i64) -> Result<Vec<Notification>, AppError>;

    /// Find a notification by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, AppError>;

    /// Mark a notification as read and return the updated row.
    async fn mark_as_read(&self, id: i64) -> Result<Notification, AppError>;

    /// Number of unread notifications for a user.
    async fn unread_count(&self, user_id: i64) -> Result<i64, AppError>;
}
