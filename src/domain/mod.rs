//! # Domain Layer
//!
//! The domain layer contains the core types of the realtime server.
//! It is independent of any transport or storage concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (Principal, ChatRoom, ChatMessage, Notification, Event)
//! - **value_objects**: Immutable value types (Topic, ConnectionHandle)
//! - **services**: Domain ports (EventPublisher)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Events are produced only from persisted entities

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
pub use value_objects::*;
