//! Notification Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::CreateNotificationRequest;
use crate::application::dto::response::UnreadCountResponse;
use crate::domain::Notification;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate;
use crate::startup::AppState;

/// List notifications of the current user
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = state.notifications.my_notifications(&auth.principal).await?;
    Ok(Json(notifications))
}

/// Create a notification.
///
/// Any user may notify themselves; addressing another user requires the
/// admin role.
pub async fn create_notification(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    validate(&body)?;

    let recipient = body.user_id.unwrap_or(auth.user_id());
    if recipient != auth.user_id() && !auth.principal.is_admin() {
        return Err(AppError::Forbidden(
            "Only administrators can notify other users".into(),
        ));
    }

    let notification = state
        .notifications
        .create_notification(body.into_new(recipient))
        .await?;

    Ok((StatusCode::CREATED, Json(notification)))
}

/// Unread notification count of the current user
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let count = state.notifications.unread_count(&auth.principal).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Mark a notification as read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(notification_id): Path<String>,
) -> Result<Json<Notification>, AppError> {
    let id: i64 = notification_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid notification ID".into()))?;

    let notification = state.notifications.mark_read(&auth.principal, id).await?;
    Ok(Json(notification))
}
