//! Connection management
//!
//! Tracks WebSocket connections and their outbound queues.

mod connection;
mod manager;

pub use connection::{Connection, ConnectionState, DeliveryError};
pub use manager::ConnectionManager;
