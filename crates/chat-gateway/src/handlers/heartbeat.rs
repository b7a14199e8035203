//! Heartbeat handler (op 1)

use super::HandlerResult;
use crate::connection::{Connection, DeliveryError};
use crate::protocol::{CloseCode, GatewayMessage};
use std::sync::Arc;

/// Handles heartbeat messages
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Handle a heartbeat from the client
    ///
    /// `last_sequence` is the last sequence number the client saw, if any.
    pub fn handle(connection: &Arc<Connection>, last_sequence: Option<u64>) -> HandlerResult<Option<CloseCode>> {
        connection.record_heartbeat();

        tracing::trace!(
            connection_id = %connection.id(),
            client_seq = ?last_sequence,
            server_seq = connection.current_sequence(),
            "Heartbeat received"
        );

        match connection.push(GatewayMessage::heartbeat_ack()) {
            Ok(()) => Ok(None),
            Err(DeliveryError::Closed) => {
                tracing::debug!(connection_id = %connection.id(), "Heartbeat on closed connection");
                Ok(None)
            }
            // Reader stopped draining, end the transport
            Err(DeliveryError::Full) => {
                if connection.mark_lagging() {
                    tracing::warn!(connection_id = %connection.id(), "Outbound queue full on heartbeat ACK, connection lagging");
                }
                Ok(Some(CloseCode::UnknownError))
            }
        }
    }
}
