//! Connection manager
//!
//! Tracks every live WebSocket connection using DashMap for thread-safe access.
//! Only the lifecycle controller adds and removes entries; anyone may read.

use super::Connection;
use chat_core::ConnectionId;
use dashmap::DashMap;
use std::sync::Arc;

/// Manages all live WebSocket connections
#[derive(Debug, Default)]
pub struct ConnectionManager {
    /// Live connections by connection ID
    connections: DashMap<ConnectionId, Arc<Connection>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a connection
    ///
    /// Returns `false` if the id is already taken.
    pub fn add_connection(&self, connection: Arc<Connection>) -> bool {
        let id = connection.id().clone();
        if self.connections.contains_key(&id) {
            return false;
        }
        self.connections.insert(id.clone(), connection);

        tracing::debug!(connection_id = %id, "Connection added");
        true
    }

    /// Remove a connection and close its outbound queue
    pub fn remove_connection(&self, id: &ConnectionId) -> Option<Arc<Connection>> {
        let (_, connection) = self.connections.remove(id)?;
        connection.close();

        tracing::debug!(connection_id = %id, "Connection removed");
        Some(connection)
    }

    /// Get a connection by ID
    pub fn get_connection(&self, id: &ConnectionId) -> Option<Arc<Connection>> {
        self.connections.get(id).map(|r| r.clone())
    }

    /// Check if a connection is registered
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    /// All live connections
    pub fn connections(&self) -> Vec<Arc<Connection>> {
        self.connections.iter().map(|r| r.value().clone()).collect()
    }

    /// All live connections except `exclude`
    pub fn connections_except(&self, exclude: &ConnectionId) -> Vec<Arc<Connection>> {
        self.connections
            .iter()
            .filter(|r| r.key() != exclude)
            .map(|r| r.value().clone())
            .collect()
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Close and forget every connection
    pub fn clear(&self) {
        for connection in self.connections() {
            self.remove_connection(connection.id());
        }
    }
}
