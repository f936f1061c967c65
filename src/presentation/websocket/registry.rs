//! Connection Registry
//!
//! Owns every live gateway connection: its principal, the rooms it has joined
//! and the sink its frames are written to.
//!
//! The handle table and both reverse indices (room -> handles, user ->
//! handles) sit behind a single lock. Every mutation is one write-locked
//! critical section and every snapshot one read-locked section, so readers can
//! never observe a handle present in one table but missing from another.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::messages::ServerFrame;
use crate::domain::{ConnectionHandle, Principal};
use crate::infrastructure::metrics;
use crate::shared::error::RealtimeError;

/// Outbound frame sink of one connection
pub type ConnectionSink = mpsc::UnboundedSender<ServerFrame>;

struct ConnectionEntry {
    principal: Principal,
    rooms: HashSet<i64>,
    sink: ConnectionSink,
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionHandle, ConnectionEntry>,
    rooms: HashMap<i64, HashSet<ConnectionHandle>>,
    users: HashMap<i64, HashSet<ConnectionHandle>>,
}

impl RegistryState {
    fn index_remove(
        index: &mut HashMap<i64, HashSet<ConnectionHandle>>,
        key: i64,
        handle: &ConnectionHandle,
    ) {
        if let Some(handles) = index.get_mut(&key) {
            handles.remove(handle);
            if handles.is_empty() {
                index.remove(&key);
            }
        }
    }
}

/// Registry of live gateway connections
#[derive(Default)]
pub struct ConnectionRegistry {
    state: RwLock<RegistryState>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handle to a principal and its outbound sink.
    ///
    /// Re-registering with the same principal refreshes the sink and keeps the
    /// joined rooms. A different principal on a bound handle is rejected with
    /// [`RealtimeError::AlreadyBound`].
    pub fn register(
        &self,
        handle: ConnectionHandle,
        principal: Principal,
        sink: ConnectionSink,
    ) -> Result<(), RealtimeError> {
        let count = {
            let mut state = self.state.write();

            if let Some(entry) = state.connections.get_mut(&handle) {
                if entry.principal != principal {
                    tracing::warn!(
                        connection_id = %handle,
                        bound_user_id = entry.principal.user_id,
                        user_id = principal.user_id,
                        "Rejected rebind of connection handle"
                    );
                    return Err(RealtimeError::AlreadyBound);
                }
                entry.sink = sink;
                return Ok(());
            }

            state.connections.insert(
                handle,
                ConnectionEntry {
                    principal,
                    rooms: HashSet::new(),
                    sink,
                },
            );
            state
                .users
                .entry(principal.user_id)
                .or_default()
                .insert(handle);
            state.connections.len()
        };

        metrics::set_gateway_connections(count);
        tracing::info!(
            connection_id = %handle,
            user_id = principal.user_id,
            "Connection registered"
        );
        Ok(())
    }

    /// Remove a handle and all of its room memberships.
    ///
    /// Unknown handles are a no-op. Returns whether anything was removed.
    pub fn unregister(&self, handle: &ConnectionHandle) -> bool {
        let (removed, count) = {
            let mut state = self.state.write();
            let Some(entry) = state.connections.remove(handle) else {
                return false;
            };

            for room_id in &entry.rooms {
                RegistryState::index_remove(&mut state.rooms, *room_id, handle);
            }
            RegistryState::index_remove(&mut state.users, entry.principal.user_id, handle);

            (entry, state.connections.len())
        };

        metrics::set_gateway_connections(count);
        tracing::info!(
            connection_id = %handle,
            user_id = removed.principal.user_id,
            rooms = removed.rooms.len(),
            "Connection unregistered"
        );
        true
    }

    /// Add a room to a connection's room set.
    ///
    /// Membership must already have been authorised by the caller. Re-joining
    /// is a no-op success.
    pub fn join_room(&self, handle: &ConnectionHandle, room_id: i64) -> Result<(), RealtimeError> {
        let mut state = self.state.write();
        let entry = state
            .connections
            .get_mut(handle)
            .ok_or(RealtimeError::NotAuthenticated)?;

        if entry.rooms.insert(room_id) {
            state.rooms.entry(room_id).or_default().insert(*handle);
        }
        Ok(())
    }

    /// Remove a room from a connection's room set. Idempotent.
    pub fn leave_room(&self, handle: &ConnectionHandle, room_id: i64) {
        let mut state = self.state.write();
        let removed = state
            .connections
            .get_mut(handle)
            .map(|entry| entry.rooms.remove(&room_id))
            .unwrap_or(false);

        if removed {
            RegistryState::index_remove(&mut state.rooms, room_id, handle);
        }
    }

    /// Snapshot of live connections joined to a room.
    pub fn connections_for(&self, room_id: i64) -> HashSet<ConnectionHandle> {
        self.state
            .read()
            .rooms
            .get(&room_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of live connections authenticated as a user.
    pub fn connections_for_user(&self, user_id: i64) -> HashSet<ConnectionHandle> {
        self.state
            .read()
            .users
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn principal_for(&self, handle: &ConnectionHandle) -> Option<Principal> {
        self.state
            .read()
            .connections
            .get(handle)
            .map(|entry| entry.principal)
    }

    /// Rooms currently joined by a connection.
    pub fn rooms_of(&self, handle: &ConnectionHandle) -> HashSet<i64> {
        self.state
            .read()
            .connections
            .get(handle)
            .map(|entry| entry.rooms.clone())
            .unwrap_or_default()
    }

    /// Write a frame to a connection's sink.
    ///
    /// `Ok(false)` if the handle is no longer registered,
    /// `Err(TransportClosed)` if the sink's receiving side is gone.
    pub fn push(
        &self,
        handle: &ConnectionHandle,
        frame: ServerFrame,
    ) -> Result<bool, RealtimeError> {
        let state = self.state.read();
        match state.connections.get(handle) {
            Some(entry) => entry
                .sink
                .send(frame)
                .map(|_| true)
                .map_err(|_| RealtimeError::TransportClosed),
            None => Ok(false),
        }
    }

    pub fn connection_count(&self) -> usize {
        self.state.read().connections.len()
    }

    /// Number of rooms with at least one joined connection.
    pub fn room_count(&self) -> usize {
        self.state.read().rooms.len()
    }
}
