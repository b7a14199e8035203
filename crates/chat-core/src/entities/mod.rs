//! Domain entities - core objects of the chat room

mod identity;
mod message;
mod presence;
mod typing;

pub use identity::Identity;
pub use message::{validate_content, Message};
pub use presence::PresenceEntry;
pub use typing::TypingSignal;
