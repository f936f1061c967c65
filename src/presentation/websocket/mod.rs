//! WebSocket Gateway
//!
//! Real-time delivery: the connection registry, room membership, the
//! delivery dispatcher and the two socket endpoints built on them.

pub mod dispatcher;
pub mod handler;
pub mod membership;
pub mod messages;
pub mod registry;
pub mod session;
pub mod subscriptions;

pub use dispatcher::DeliveryDispatcher;
pub use handler::ws_handler;
pub use membership::MembershipManager;
pub use messages::{ClientCommand, ServerFrame, SubscriptionFrame, SubscriptionRequest};
pub use registry::{ConnectionRegistry, ConnectionSink};
pub use session::SessionState;
pub use subscriptions::subscriptions_handler;
