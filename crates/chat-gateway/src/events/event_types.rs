//! Gateway event types
//!
//! Event names sent in the `t` field of dispatch messages.

use chat_core::BroadcastEvent;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GatewayEventType {
    /// A message was appended
    NewMessage,
    /// Someone joined
    UserJoined,
    /// Someone left
    UserLeft,
    /// Full presence snapshot
    ActiveUsers,
    /// Someone started typing
    UserTyping,
    /// Someone stopped typing
    UserStoppedTyping,
}

impl GatewayEventType {
    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewMessage => "newMessage",
            Self::UserJoined => "userJoined",
            Self::UserLeft => "userLeft",
            Self::ActiveUsers => "activeUsers",
            Self::UserTyping => "userTyping",
            Self::UserStoppedTyping => "userStoppedTyping",
        }
    }
}

impl From<&BroadcastEvent> for GatewayEventType {
    fn from(event: &BroadcastEvent) -> Self {
        match event {
            BroadcastEvent::MessageCreated(_) => Self::NewMessage,
            BroadcastEvent::UserJoined(_) => Self::UserJoined,
            BroadcastEvent::UserLeft(_) => Self::UserLeft,
            BroadcastEvent::PresenceSnapshot(_) => Self::ActiveUsers,
            BroadcastEvent::TypingStarted(_) => Self::UserTyping,
            BroadcastEvent::TypingStopped(_) => Self::UserStoppedTyping,
        }
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
