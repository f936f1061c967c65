//! WebSocket Connection Handler
//!
//! The `/gateway` socket. The credential is verified before the upgrade; a
//! connection that fails the handshake never reaches the registry.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

use super::messages::{ClientCommand, ServerFrame};
use super::session::SessionState;
use crate::domain::{ConnectionHandle, Principal};
use crate::presentation::middleware::auth::bearer_token;
use crate::shared::error::{AppError, RealtimeError};
use crate::startup::AppState;

/// Query parameters accepted on socket upgrade
#[derive(Debug, Default, Deserialize)]
pub struct HandshakeQuery {
    pub token: Option<String>,
}

/// Credential presented at handshake: `?token=` wins over the Authorization header.
pub fn handshake_credential(query: &HandshakeQuery, headers: &HeaderMap) -> Option<String> {
    query
        .token
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(headers))
}

/// Verify the handshake credential, or build the rejection response.
pub(crate) fn authenticate_handshake(
    state: &AppState,
    query: &HandshakeQuery,
    headers: &HeaderMap,
) -> Result<Principal, Response> {
    state
        .authenticator
        .authenticate(handshake_credential(query, headers).as_deref())
        .map_err(|e| {
            tracing::debug!(error = %e, "Handshake rejected");
            AppError::from(e).into_response()
        })
}

/// WebSocket upgrade handler
pub async fn ws_handler(
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

/// Forward serialized frames from `rx` to the socket until either side closes.
pub(crate) fn spawn_writer<T>(
    mut sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<T>,
) -> JoinHandle<()>
where
    T: Serialize + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize frame: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    })
}

/// Both sockets speak JSON text only.
pub(crate) fn binary_unsupported() -> RealtimeError {
    RealtimeError::InvalidFrame("binary frames are not supported".into())
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, principal: Principal) {
    let handle = ConnectionHandle::new();
    let mut session = SessionState::new(handle, principal);

    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<ServerFrame>();
    let sender_task = spawn_writer(sender, rx);

    if let Err(e) = state.registry.register(handle, principal, tx.clone()) {
        tracing::warn!(connection_id = %handle, error = %e, "Registration refused");
        let _ = tx.send(ServerFrame::error(&e));
        drop(tx);
        let _ = sender_task.await;
        return;
    }

    let _ = tx.send(ServerFrame::Ready {
        connection_id: handle.to_string(),
        user_id: principal.user_id,
    });

    tracing::info!(
        user_id = principal.user_id,
        connection_id = %handle,
        "User connected"
    );

    let idle_timeout = Duration::from_secs(state.settings.websocket.idle_timeout_secs);
    let mut idle_check = interval(Duration::from_secs(
        state.settings.websocket.heartbeat_check_secs.max(1),
    ));
    idle_check.tick().await; // Skip first immediate tick

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        session.touch();
                        let reply = match ClientCommand::parse(text.as_str()) {
                            Ok(command) => handle_command(&state, &session, command).await,
                            Err(e) => Err(e),
                        };
                        let fatal = matches!(&reply, Err(e) if e.is_fatal());
                        let frame = reply.unwrap_or_else(|e| {
                            tracing::debug!(
                                connection_id = %handle,
                                error = %e,
                                "Command rejected"
                            );
                            ServerFrame::error(&e)
                        });
                        if tx.send(frame).is_err() || fatal {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        session.touch();
                        let _ = tx.send(ServerFrame::error(&binary_unsupported()));
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        // Pong is handled automatically by axum
                        session.touch();
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(connection_id = %handle, "Connection closed");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::debug!(connection_id = %handle, error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            _ = idle_check.tick() => {
                if session.is_idle(idle_timeout) {
                    tracing::info!(connection_id = %handle, "Idle timeout, closing connection");
                    break;
                }
            }
        }
    }

    state.registry.unregister(&handle);
    sender_task.abort();

    tracing::info!(
        user_id = principal.user_id,
        connection_id = %handle,
        duration_secs = session.connected_at.elapsed().as_secs(),
        "User disconnected"
    );
}

/// Execute one gateway command on behalf of the session.
pub(crate) async fn handle_command(
    state: &AppState,
    session: &SessionState,
    command: ClientCommand,
) -> Result<ServerFrame, RealtimeError> {
    match command {
        ClientCommand::Join { room_id } => {
            state.membership.join(&session.handle, room_id).await?;
            Ok(ServerFrame::Joined { room_id })
        }
        ClientCommand::Leave { room_id } => {
            state.membership.leave(&session.handle, room_id);
            Ok(ServerFrame::Left { room_id })
        }
        ClientCommand::Send { room_id, content } => {
            let message = state
                .chat
                .send_message(&session.principal, room_id, &content)
                .await?;
            Ok(ServerFrame::Sent {
                room_id,
                message_id: message.id,
            })
        }
        ClientCommand::Ping => Ok(ServerFrame::Pong),
    }
}
