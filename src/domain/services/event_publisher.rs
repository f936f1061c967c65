//! Event publishing port.
//!
//! Services call [`EventPublisher::publish`] only after the triggering domain
//! action has been persisted. The delivery layer implements it.

use crate::domain::entities::Event;

/// Outcome of delivering one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Registry connections the event was pushed to
    pub pushed: usize,
    /// Registry connections found dead during the push and unregistered
    pub dropped: usize,
    /// Bridge subscribers reached by the publish
    pub subscribers: usize,
}

/// Hands persisted events to every delivery path.
#[cfg_attr(test, mockall::automock)]
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: Event) -> DeliveryReport;
}
