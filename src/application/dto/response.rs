//! Response DTOs
//!
//! Data structures for API response bodies. Entities serialize directly;
//! only derived views live here.

use serde::Serialize;

/// Unread notification counter
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}
