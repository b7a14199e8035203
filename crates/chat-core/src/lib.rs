//! # chat-core
//!
//! Domain layer for the realtime chat room: identities, messages, typing signals,
//! presence entries and the events broadcast to connections.
//! This crate has zero dependencies on infrastructure (transport, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{validate_content, Identity, Message, PresenceEntry, TypingSignal};
pub use error::DomainError;
pub use events::BroadcastEvent;
pub use value_objects::{ConnectionId, MessageId, MessageIdGenerator, UserId};
