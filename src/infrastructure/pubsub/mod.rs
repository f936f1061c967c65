//! In-process publish/subscribe
//!
//! The event bridge consumed by the subscription transport.

pub mod event_bridge;

pub use event_bridge::{EventBridge, EventStream, Subscription};
