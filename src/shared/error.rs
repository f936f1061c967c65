//! Application Error Types
//!
//! Centralized error handling with Axum integration.
//!
//! - [`AppError`] is the HTTP-facing error with numeric codes.
//! - [`RealtimeError`] is the taxonomy of the delivery core (handshake,
//!   registry, membership, transport, persistence). It converts into
//!   [`AppError`] when surfaced through the HTTP API and into an error frame
//!   when surfaced on a socket.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors of the realtime delivery core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RealtimeError {
    /// Missing, malformed, expired or otherwise invalid credential.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Operation on a handle that has no bound principal.
    #[error("Connection is not authenticated")]
    NotAuthenticated,

    /// The principal is not a persisted member of the room.
    #[error("Not a member of room {room_id}")]
    NotAMember { room_id: i64 },

    /// A different principal tried to bind an already bound handle.
    #[error("Connection handle already bound to another principal")]
    AlreadyBound,

    /// Best-effort send to a connection failed.
    #[error("Transport closed")]
    TransportClosed,

    /// The storage collaborator failed; nothing was delivered.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// A socket frame that could not be decoded.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}

impl RealtimeError {
    /// Stable machine-readable code used in socket error frames.
    pub fn code(&self) -> &'static str {
        match self {
            RealtimeError::Unauthenticated => "UNAUTHENTICATED",
            RealtimeError::NotAuthenticated => "NOT_AUTHENTICATED",
            RealtimeError::NotAMember { .. } => "NOT_A_MEMBER",
            RealtimeError::AlreadyBound => "ALREADY_BOUND",
            RealtimeError::TransportClosed => "TRANSPORT_CLOSED",
            RealtimeError::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            RealtimeError::InvalidFrame(_) => "INVALID_FRAME",
        }
    }

    /// Message safe to show to the client. Persistence details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            RealtimeError::PersistenceFailure(_) => "Persistence failure".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the connection must be terminated after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RealtimeError::Unauthenticated | RealtimeError::AlreadyBound
        )
    }
}

impl From<AppError> for RealtimeError {
    fn from(err: AppError) -> Self {
        match err {
            // Content rejected by storage is the client's fault, not an outage.
            AppError::Validation(msg) | AppError::BadRequest(msg) => {
                RealtimeError::InvalidFrame(msg)
            }
            other => RealtimeError::PersistenceFailure(other.to_string()),
        }
    }
}

impl From<RealtimeError> for AppError {
    fn from(err: RealtimeError) -> Self {
        match err {
            RealtimeError::Unauthenticated | RealtimeError::NotAuthenticated => {
                AppError::Unauthorized(err.to_string())
            }
            RealtimeError::NotAMember { .. } => AppError::Forbidden(err.to_string()),
            RealtimeError::AlreadyBound => AppError::Conflict(err.to_string()),
            RealtimeError::InvalidFrame(msg) => AppError::BadRequest(msg),
            RealtimeError::TransportClosed | RealtimeError::PersistenceFailure(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 10001, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 10002, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, 10003, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, 10004, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, 10005, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, 10007, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
        };

        let body = ErrorResponse { code, message };

        (status, Json(body)).into_response()
    }
}
