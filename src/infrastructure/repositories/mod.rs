//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **ChatRepository** - Rooms, messages and the room membership authority
//! - **NotificationRepository** - User notifications and read state

mod chat_repository;
mod notification_repository;

pub use chat_repository::PgChatRepository;
pub use notification_repository::PgNotificationRepository;
