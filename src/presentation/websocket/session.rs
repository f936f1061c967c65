//! WebSocket Session State

use std::time::{Duration, Instant};

use crate::domain::{ConnectionHandle, Principal};

/// Per-socket state owned by the connection task
#[derive(Debug)]
pub struct SessionState {
    pub handle: ConnectionHandle,
    pub principal: Principal,
    pub connected_at: Instant,
    pub last_activity: Instant,
}

impl SessionState {
    pub fn new(handle: ConnectionHandle, principal: Principal) -> Self {
        let now = Instant::now();
        Self {
            handle,
            principal,
            connected_at: now,
            last_activity: now,
        }
    }

    /// Record inbound traffic from the client.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn is_idle(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() >= timeout
    }
}
