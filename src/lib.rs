//! # Chat Realtime Library
//!
//! Real-time chat and notification delivery:
//! - WebSocket gateway with room membership and live message push
//! - Subscription socket over an in-process topic event bridge
//! - RESTful HTTP API for rooms, messages and notifications
//! - PostgreSQL for persistent storage
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core entities, value objects, repository traits and the delivery port
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, event bridge and metrics implementations
//! - **Presentation Layer**: HTTP handlers and WebSocket endpoints
//!
//! ## Module Structure
//!
//! ```text
//! chat_realtime/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, value objects, and traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, pub/sub and metrics implementations
//! +-- presentation/   HTTP routes and WebSocket handlers
//! +-- shared/         Common utilities (errors, validation)
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shared;
pub mod startup;
pub mod telemetry;
