//! Broadcast router
//!
//! Fans a room event out to connection queues. Each event is serialized once;
//! every recipient then gets a copy stamped with its own sequence number.
//! Delivery never blocks and never fails as a whole: a closed queue is skipped
//! and a full one flags its connection as lagging for the controller to drop.

use crate::connection::{Connection, ConnectionManager, DeliveryError};
use crate::events::GatewayEventType;
use crate::protocol::GatewayMessage;
use chat_core::{BroadcastEvent, ConnectionId};
use std::sync::Arc;

/// Outcome of one fan-out
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RouteReport {
    /// Connections the event was queued for
    pub delivered: usize,
    /// Connections whose queue had already closed
    pub skipped: usize,
    /// Connections whose queue was full
    pub lagging: Vec<ConnectionId>,
}

impl RouteReport {
    fn record(&mut self, connection: &Connection, result: Result<(), DeliveryError>) {
        match result {
            Ok(()) => self.delivered += 1,
            Err(DeliveryError::Closed) => {
                self.skipped += 1;
                tracing::debug!(connection_id = %connection.id(), "Skipped closed connection");
            }
            Err(DeliveryError::Full) => {
                if connection.mark_lagging() {
                    tracing::warn!(connection_id = %connection.id(), "Outbound queue full, connection lagging");
                }
                self.lagging.push(connection.id().clone());
            }
        }
    }
}

/// Routes room events to live connections
#[derive(Debug, Clone)]
pub struct BroadcastRouter {
    connections: Arc<ConnectionManager>,
}

impl BroadcastRouter {
    /// Create a router over the given connection set
    #[must_use]
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    /// Deliver `event` to every live connection, the originator included
    pub fn broadcast_all(&self, event: &BroadcastEvent) -> RouteReport {
        let recipients = self.connections.connections();
        self.fan_out(event, &recipients)
    }

    /// Deliver `event` to every live connection except `origin`
    pub fn broadcast_others(&self, origin: &ConnectionId, event: &BroadcastEvent) -> RouteReport {
        let recipients = self.connections.connections_except(origin);
        self.fan_out(event, &recipients)
    }

    /// Queue an unsequenced message for one connection
    pub fn send_to(&self, target: &ConnectionId, message: GatewayMessage) -> RouteReport {
        let mut report = RouteReport::default();
        match self.connections.get_connection(target) {
            Some(connection) => {
                let result = connection.push(message);
                report.record(&connection, result);
            }
            None => report.skipped += 1,
        }
        report
    }

    fn fan_out(&self, event: &BroadcastEvent, recipients: &[Arc<Connection>]) -> RouteReport {
        let mut report = RouteReport::default();

        let payload = match event.payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(event = %event, error = %e, "Failed to serialize event, dropping it");
                return report;
            }
        };
        let event_type = GatewayEventType::from(event);

        for connection in recipients {
            let result = connection.dispatch(event_type.as_str(), &payload).map(|_| ());
            report.record(connection, result);
        }

        tracing::trace!(
            event = %event_type,
            sent = report.delivered,
            skipped = report.skipped,
            lagging = report.lagging.len(),
            "Event routed"
        );

        report
    }
}
