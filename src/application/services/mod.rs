//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **Authenticator**: Handshake credential verification
//! - **ChatService**: Rooms, message history and message sending
//! - **NotificationService**: Notification creation and inbox queries

pub mod auth_service;
pub mod chat_service;
pub mod notification_service;

pub use auth_service::{Authenticator, Claims, JwtAuthenticator, Subject};
pub use chat_service::ChatService;
pub use notification_service::NotificationService;
