//! Room and Message Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreateRoomRequest, SendMessageRequest};
use crate::domain::{ChatMessage, ChatRoom};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate;
use crate::startup::AppState;

fn parse_room_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid room ID".into()))
}

/// List rooms of the current user
pub async fn list_rooms(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ChatRoom>>, AppError> {
    let rooms = state.chat.my_rooms(&auth.principal).await?;
    Ok(Json(rooms))
}

/// Create a room
pub async fn create_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<ChatRoom>), AppError> {
    validate(&body)?;

    let room = state
        .chat
        .create_room(&auth.principal, body.name.trim(), &body.participant_ids)
        .await?;

    Ok((StatusCode::CREATED, Json(room)))
}

/// Message history of a room
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let room_id = parse_room_id(&room_id)?;
    let messages = state.chat.room_messages(&auth.principal, room_id).await?;
    Ok(Json(messages))
}

/// Send a message to a room; delivered exactly like a gateway `send`
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(room_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let room_id = parse_room_id(&room_id)?;
    validate(&body)?;

    let message = state
        .chat
        .send_message(&auth.principal, room_id, &body.content)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}
