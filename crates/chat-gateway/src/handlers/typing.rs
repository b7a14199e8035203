//! Typing handlers (op 4, op 5)

use super::{settle, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, TypingPayload};
use crate::server::GatewayState;
use std::sync::Arc;

/// Handles Typing and StopTyping messages
pub struct TypingHandler;

impl TypingHandler {
    /// Mark the connection's identity as typing
    pub async fn start(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: TypingPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let result = state
            .engine()
            .typing(connection.id().clone(), payload.claimed())
            .await;

        settle(connection, "Typing", result)
    }

    /// Clear the connection's identity typing flag
    pub async fn stop(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: TypingPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let result = state
            .engine()
            .stop_typing(connection.id().clone(), payload.claimed())
            .await;

        settle(connection, "StopTyping", result)
    }
}
