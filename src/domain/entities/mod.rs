//! # Domain Entities
//!
//! Core domain entities of the realtime delivery server.
//!
//! ## Core Entities
//!
//! - **Principal**: Authenticated identity bound to a connection
//! - **ChatRoom**: A room whose participants may exchange messages
//! - **ChatMessage**: A persisted message in a room
//! - **Notification**: A persisted notification addressed to one user
//! - **Event**: A published realtime event
//!
//! ## Repository Traits
//!
//! Storage is an external collaborator reached through the repository traits
//! declared next to their entities. Implementations live in the
//! infrastructure layer.

mod event;
mod message;
mod notification;
mod principal;
mod room;

pub use event::{Event, PushPayload};
pub use message::{ChatMessage, MAX_MESSAGE_LENGTH};
pub use notification::{NewNotification, Notification, NotificationRepository};
pub use principal::{Principal, Role};
pub use room::{ChatRoom, ChatRepository};

#[cfg(test)]
pub use notification::MockNotificationRepository;
#[cfg(test)]
pub use room::MockChatRepository;
