//! # Domain Services
//!
//! Domain-level ports used by the application services.
//!
//! ## Services
//!
//! - **EventPublisher**: Delivery port invoked after successful persistence

mod event_publisher;

pub use event_publisher::*;
