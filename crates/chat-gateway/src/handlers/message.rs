//! SendMessage handler (op 3)

use super::{settle, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, SendMessagePayload};
use crate::server::GatewayState;
use std::sync::Arc;

/// Handles SendMessage messages
pub struct MessageHandler;

impl MessageHandler {
    /// Hand the message to the engine
    ///
    /// Validation and attribution happen there; a rejection has already been
    /// queued for the client by the time this returns.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: SendMessagePayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let claimed = payload.claimed();
        let result = state
            .engine()
            .send_message(connection.id().clone(), payload.content, claimed)
            .await;

        settle(connection, "SendMessage", result)
    }
}
