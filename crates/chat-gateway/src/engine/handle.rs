//! Engine handle - the front door transport tasks use

use super::{Command, EngineError};
use crate::connection::Connection;
use chat_core::{ConnectionId, Identity, Message};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Cloneable handle to the lifecycle controller
///
/// Never touches the stores; every call becomes one queued command.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Command>,
}

impl EngineHandle {
    /// Wrap a command sender
    pub fn new(commands: mpsc::Sender<Command>) -> Self {
        Self { commands }
    }

    /// Register a freshly opened connection
    ///
    /// Returns `false` if its id was already taken.
    pub async fn connect(&self, connection: Arc<Connection>) -> Result<bool, EngineError> {
        self.request(|reply| Command::Connect { connection, reply }).await
    }

    /// Declare the identity a connection represents
    pub async fn join(&self, connection_id: ConnectionId, identity: Identity) -> Result<(), EngineError> {
        self.request(|reply| Command::Join {
            connection_id,
            identity,
            reply,
        })
        .await?
        .map_err(Into::into)
    }

    /// Append and broadcast a chat message
    pub async fn send_message(
        &self,
        connection_id: ConnectionId,
        content: String,
        claimed: Option<Identity>,
    ) -> Result<Message, EngineError> {
        self.request(|reply| Command::SendMessage {
            connection_id,
            content,
            claimed,
            reply,
        })
        .await?
        .map_err(Into::into)
    }

    /// Mark the connection's identity as typing
    pub async fn typing(&self, connection_id: ConnectionId, claimed: Option<Identity>) -> Result<(), EngineError> {
        self.request(|reply| Command::Typing {
            connection_id,
            claimed,
            reply,
        })
        .await?
        .map_err(Into::into)
    }

    /// Clear the connection's identity typing flag
    pub async fn stop_typing(
        &self,
        connection_id: ConnectionId,
        claimed: Option<Identity>,
    ) -> Result<(), EngineError> {
        self.request(|reply| Command::StopTyping {
            connection_id,
            claimed,
            reply,
        })
        .await?
        .map_err(Into::into)
    }

    /// Close the connection and clean up after it
    ///
    /// Returns the identity that left, or `None` if it never joined.
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Result<Option<Identity>, EngineError> {
        self.request(|reply| Command::Disconnect { connection_id, reply })
            .await?
            .map_err(Into::into)
    }

    async fn request<R>(&self, build: impl FnOnce(oneshot::Sender<R>) -> Command) -> Result<R, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| EngineError::Stopped)?;
        rx.await.map_err(|_| EngineError::Stopped)
    }
}
