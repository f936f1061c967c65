//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **Topic**: Routing scope for published events (`room:<id>`, `user:<id>`)
//! - **ConnectionHandle**: Opaque per-socket registry key

mod connection_handle;
mod topic;

pub use connection_handle::*;
pub use topic::*;
