//! Commands accepted by the lifecycle controller

use crate::connection::Connection;
use chat_core::{ConnectionId, DomainError, Identity, Message};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Reply channel for a transition
pub type Reply<T> = oneshot::Sender<Result<T, DomainError>>;

/// One request for the controller
///
/// `claimed` carries identity fields the client repeated in its payload; they
/// are only compared against the registered identity, never trusted.
#[derive(Debug)]
pub enum Command {
    Connect {
        connection: Arc<Connection>,
        reply: oneshot::Sender<bool>,
    },
    Join {
        connection_id: ConnectionId,
        identity: Identity,
        reply: Reply<()>,
    },
    SendMessage {
        connection_id: ConnectionId,
        content: String,
        claimed: Option<Identity>,
        reply: Reply<Message>,
    },
    Typing {
        connection_id: ConnectionId,
        claimed: Option<Identity>,
        reply: Reply<()>,
    },
    StopTyping {
        connection_id: ConnectionId,
        claimed: Option<Identity>,
        reply: Reply<()>,
    },
    Disconnect {
        connection_id: ConnectionId,
        reply: Reply<Option<Identity>>,
    },
}

impl Command {
    /// Command name, for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "Connect",
            Self::Join { .. } => "Join",
            Self::SendMessage { .. } => "SendMessage",
            Self::Typing { .. } => "Typing",
            Self::StopTyping { .. } => "StopTyping",
            Self::Disconnect { .. } => "Disconnect",
        }
    }

    /// Connection the command is about
    #[must_use]
    pub fn connection_id(&self) -> &ConnectionId {
        match self {
            Self::Connect { connection, .. } => connection.id(),
            Self::Join { connection_id, .. }
            | Self::SendMessage { connection_id, .. }
            | Self::Typing { connection_id, .. }
            | Self::StopTyping { connection_id, .. }
            | Self::Disconnect { connection_id, .. } => connection_id,
        }
    }
}
