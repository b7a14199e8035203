//! Broadcast events - what the engine fans out to connections

mod broadcast_event;

pub use broadcast_event::BroadcastEvent;
