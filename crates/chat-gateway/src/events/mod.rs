//! Gateway events
//!
//! Names for the room events dispatched to clients. Payloads are the
//! serialized `BroadcastEvent` itself.

mod event_types;

pub use event_types::GatewayEventType;
