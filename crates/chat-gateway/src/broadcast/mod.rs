//! Event broadcasting
//!
//! Distributes room events from the engine to WebSocket connections.

mod router;

pub use router::{BroadcastRouter, RouteReport};
