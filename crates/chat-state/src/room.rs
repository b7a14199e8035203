//! Room state - the three stores behind shared locks
//!
//! Only the lifecycle controller takes write locks, and it takes them one
//! transition at a time. Readers (HTTP history, health) take read locks and
//! therefore only ever see fully applied transitions.

use std::sync::Arc;

use chat_core::{Identity, Message, TypingSignal};
use parking_lot::RwLock;

use crate::{MessageLog, PresenceRegistry, TypingTracker};

/// Shared room state
pub type SharedRoomState = Arc<RoomState>;

/// Room state container
#[derive(Debug, Default)]
pub struct RoomState {
    presence: RwLock<PresenceRegistry>,
    messages: RwLock<MessageLog>,
    typing: RwLock<TypingTracker>,
}

impl RoomState {
    /// Create empty room state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty room state wrapped for sharing
    #[must_use]
    pub fn new_shared() -> SharedRoomState {
        Arc::new(Self::new())
    }

    /// Presence registry lock
    pub fn presence(&self) -> &RwLock<PresenceRegistry> {
        &self.presence
    }

    /// Message log lock
    pub fn messages(&self) -> &RwLock<MessageLog> {
        &self.messages
    }

    /// Typing tracker lock
    pub fn typing(&self) -> &RwLock<TypingTracker> {
        &self.typing
    }

    /// Presence snapshot, in join order
    #[must_use]
    pub fn snapshot(&self) -> Vec<Identity> {
        self.presence.read().snapshot()
    }

    /// Message history, in append order
    #[must_use]
    pub fn history(&self) -> Vec<Message> {
        self.messages.read().history()
    }

    /// Currently typing identities
    #[must_use]
    pub fn typing_now(&self) -> Vec<TypingSignal> {
        self.typing.read().active()
    }

    /// Number of joined connections
    #[must_use]
    pub fn online_count(&self) -> usize {
        self.presence.read().len()
    }

    /// Number of stored messages
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.read().len()
    }
}
