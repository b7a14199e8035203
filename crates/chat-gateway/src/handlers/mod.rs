//! Op code handlers
//!
//! Handles incoming WebSocket messages based on their operation code.

mod error;
mod heartbeat;
mod join;
mod message;
mod typing;

pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use join::JoinHandler;
pub use message::MessageHandler;
pub use typing::TypingHandler;

use crate::connection::Connection;
use crate::engine::EngineError;
use crate::protocol::{CloseCode, GatewayMessage, OpCode};
use crate::server::GatewayState;
use std::sync::Arc;

/// Dispatch incoming client messages to appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle an incoming client message
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        // Validate that this is a client-sendable op code
        if !message.op.is_client_op() {
            tracing::warn!(
                connection_id = %connection.id(),
                op = %message.op,
                "Received server-only op code from client"
            );
            return Ok(Some(CloseCode::UnknownOpcode));
        }

        match message.op {
            OpCode::Heartbeat => {
                let seq = message.as_heartbeat_seq().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Heartbeat payload".to_string())
                })?;

                HeartbeatHandler::handle(connection, seq)
            }
            OpCode::Join => {
                let payload = message
                    .as_join()
                    .ok_or_else(|| HandlerError::InvalidPayload("Invalid Join payload".to_string()))?;

                JoinHandler::handle(state, connection, payload).await
            }
            OpCode::SendMessage => {
                let payload = message.as_send_message().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid SendMessage payload".to_string())
                })?;

                MessageHandler::handle(state, connection, payload).await
            }
            OpCode::Typing => {
                let payload = message
                    .as_typing()
                    .ok_or_else(|| HandlerError::InvalidPayload("Invalid Typing payload".to_string()))?;

                TypingHandler::start(state, connection, payload).await
            }
            OpCode::StopTyping => {
                let payload = message.as_typing().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid StopTyping payload".to_string())
                })?;

                TypingHandler::stop(state, connection, payload).await
            }
            // These ops should never reach here due to is_client_op check
            _ => {
                tracing::error!(op = %message.op, "Unhandled client op code");
                Ok(Some(CloseCode::UnknownOpcode))
            }
        }
    }
}

/// Turn an engine reply into a handler outcome
///
/// Domain rejections keep the connection open: the engine has already told
/// the client, or the connection is gone and there is no one to tell.
fn settle<T>(
    connection: &Connection,
    op: &'static str,
    result: Result<T, EngineError>,
) -> HandlerResult<Option<CloseCode>> {
    match result {
        Ok(_) => Ok(None),
        Err(EngineError::Domain(e)) if e.is_ignorable() => {
            tracing::debug!(connection_id = %connection.id(), op, "Dropped command for closed connection");
            Ok(None)
        }
        Err(EngineError::Domain(e)) => {
            tracing::debug!(connection_id = %connection.id(), op, code = e.code(), "Command rejected");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
