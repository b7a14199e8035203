//! Gateway state
//!
//! Application state shared by the websocket and HTTP handlers.

use crate::connection::ConnectionManager;
use crate::engine::EngineHandle;
use chat_common::{AppConfig, JwtService};
use chat_state::SharedRoomState;
use std::sync::Arc;

/// Gateway application state
///
/// Writes go through the engine handle only; `room` is for read views.
#[derive(Clone)]
pub struct GatewayState {
    /// Front door to the lifecycle controller
    engine: EngineHandle,
    /// Room stores, read side
    room: SharedRoomState,
    /// Live connections
    connections: Arc<ConnectionManager>,
    /// Token verification
    jwt: Arc<JwtService>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(
        engine: EngineHandle,
        room: SharedRoomState,
        connections: Arc<ConnectionManager>,
        jwt: JwtService,
        config: AppConfig,
    ) -> Self {
        Self {
            engine,
            room,
            connections,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }

    /// Get the engine handle
    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    /// Get the room state
    pub fn room(&self) -> &SharedRoomState {
        &self.room
    }

    /// Get the connection manager
    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    /// Get the JWT service
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("engine", &self.engine)
            .field("connections", &self.connections)
            .field("config", &"AppConfig")
            .finish_non_exhaustive()
    }
}
