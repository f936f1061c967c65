//! Subscription Socket
//!
//! The `/subscriptions` socket exposes the event bridge to clients that never
//! join rooms on the gateway. Each `subscribe` request opens one bridge
//! subscription. The socket task polls all of them itself, so `complete` or a
//! disconnect drops the subscription in place.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::Response,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_stream::StreamMap;

use super::handler::{
    authenticate_handshake, binary_unsupported, spawn_writer, HandshakeQuery,
};
use super::messages::{SubscriptionEvent, SubscriptionFrame, SubscriptionRequest};
use super::session::SessionState;
use crate::domain::{ConnectionHandle, Principal, Topic};
use crate::infrastructure::pubsub::EventStream;
use crate::shared::error::RealtimeError;
use crate::startup::AppState;

type FrameSink = mpsc::UnboundedSender<SubscriptionFrame>;

/// Live subscriptions of one socket, keyed by client-chosen id
pub(crate) struct ActiveSubscriptions {
    streams: StreamMap<String, EventStream>,
}

impl ActiveSubscriptions {
    pub(crate) fn new() -> Self {
        Self {
            streams: StreamMap::new(),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.streams.contains_key(id)
    }

    fn insert(&mut self, id: String, stream: EventStream) {
        self.streams.insert(id, stream);
    }

    /// Drop a subscription. Its bridge receiver is gone when this returns.
    fn cancel(&mut self, id: &str) -> bool {
        self.streams.remove(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.streams.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Wait for the next event of any subscription, framed for the client.
    ///
    /// Cancel safe. Pending forever while no subscription is open.
    pub(crate) async fn next_frame(&mut self) -> Option<SubscriptionFrame> {
        let (id, event) = self.streams.next().await?;
        Some(SubscriptionFrame::Next {
            id,
            payload: event.to_push(),
        })
    }
}

/// WebSocket upgrade handler for `/subscriptions`
pub async fn subscriptions_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<HandshakeQuery>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    let principal = match authenticate_handshake(&state, &query, &headers) {
        Ok(principal) => principal,
        Err(rejection) => return rejection,
    };

    let limits = &state.settings.websocket;
    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state, principal))
}

async fn handle_socket(socket: WebSocket, state: AppState, principal: Principal) {
    let mut session = SessionState::new(ConnectionHandle::new(), principal);
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<SubscriptionFrame>();
    let sender_task = spawn_writer(sender, rx);
    let mut active = ActiveSubscriptions::new();

    tracing::debug!(
        user_id = principal.user_id,
        connection_id = %session.handle,
        "Subscription socket opened"
    );

    let idle_timeout = Duration::from_secs(state.settings.websocket.idle_timeout_secs);
    let mut idle_check = interval(Duration::from_secs(
        state.settings.websocket.heartbeat_check_secs.max(1),
    ));
    idle_check.tick().await;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        session.touch();
                        match SubscriptionRequest::parse(text.as_str()) {
                            Ok(request) => {
                                handle_request(&state, &principal, request, &mut active, &tx).await;
                            }
                            Err(e) => {
                                let _ = tx.send(SubscriptionFrame::error(None, &e));
                            }
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        session.touch();
                        let _ = tx.send(SubscriptionFrame::error(None, &binary_unsupported()));
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => session.touch(),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(
                            connection_id = %session.handle,
                            error = %e,
                            "WebSocket error"
                        );
                        break;
                    }
                }
            }

            Some(frame) = active.next_frame(), if !active.is_empty() => {
                if tx.send(frame).is_err() {
                    break;
                }
            }

            _ = idle_check.tick() => {
                if session.is_idle(idle_timeout) {
                    tracing::info!(
                        connection_id = %session.handle,
                        "Idle timeout, closing subscription socket"
                    );
                    break;
                }
            }
        }
    }

    let open = active.len();
    drop(active);
    sender_task.abort();

    tracing::debug!(
        user_id = principal.user_id,
        connection_id = %session.handle,
        subscriptions = open,
        duration_secs = session.connected_at.elapsed().as_secs(),
        "Subscription socket closed"
    );
}

/// Apply one request to the socket's subscription set.
pub(crate) async fn handle_request(
    state: &AppState,
    principal: &Principal,
    request: SubscriptionRequest,
    active: &mut ActiveSubscriptions,
    tx: &FrameSink,
) {
    match request {
        SubscriptionRequest::Subscribe { id, event, room_id } => {
            if active.contains(&id) {
                let err =
                    RealtimeError::InvalidFrame(format!("subscription {} already active", id));
                let _ = tx.send(SubscriptionFrame::error(Some(id), &err));
                return;
            }

            let topic = match resolve_topic(state, principal, event, room_id).await {
                Ok(topic) => topic,
                Err(e) => {
                    tracing::debug!(
                        user_id = principal.user_id,
                        error = %e,
                        "Subscription refused"
                    );
                    let _ = tx.send(SubscriptionFrame::error(Some(id), &e));
                    return;
                }
            };

            // Events published from here on are observed.
            active.insert(id, state.bridge.subscribe(topic).into_stream());
        }
        SubscriptionRequest::Complete { id } => {
            active.cancel(&id);
            let _ = tx.send(SubscriptionFrame::Complete { id });
        }
        SubscriptionRequest::Ping => {
            let _ = tx.send(SubscriptionFrame::Pong);
        }
    }
}

/// Map a subscribe request onto the topic it may listen to.
async fn resolve_topic(
    state: &AppState,
    principal: &Principal,
    event: SubscriptionEvent,
    room_id: Option<i64>,
) -> Result<Topic, RealtimeError> {
    match event {
        SubscriptionEvent::MessageAdded => {
            let room_id = room_id
                .ok_or_else(|| RealtimeError::InvalidFrame("roomId is required".into()))?;
            state.membership.authorize_room(principal, room_id).await?;
            Ok(Topic::Room(room_id))
        }
        // Always the caller's own inbox.
        SubscriptionEvent::NotificationAdded => Ok(Topic::User(principal.user_id)),
    }
}
