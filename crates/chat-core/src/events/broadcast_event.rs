//! Broadcast events - emitted when room state changes
//!
//! Serializing an event yields its payload only; the transport attaches the event name.

use serde::Serialize;

use crate::entities::{Identity, Message, TypingSignal};

/// All events the engine fans out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BroadcastEvent {
    /// A message was appended to the log
    MessageCreated(Message),
    /// A connection joined
    UserJoined(Identity),
    /// A joined connection went away
    UserLeft(Identity),
    /// Full presence set, in join order
    PresenceSnapshot(Vec<Identity>),
    /// An identity started typing
    TypingStarted(TypingSignal),
    /// An identity stopped typing
    TypingStopped(TypingSignal),
}

impl BroadcastEvent {
    /// Variant name, for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MessageCreated(_) => "MessageCreated",
            Self::UserJoined(_) => "UserJoined",
            Self::UserLeft(_) => "UserLeft",
            Self::PresenceSnapshot(_) => "PresenceSnapshot",
            Self::TypingStarted(_) => "TypingStarted",
            Self::TypingStopped(_) => "TypingStopped",
        }
    }

    /// Serialize the payload
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl std::fmt::Display for BroadcastEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}
