//! Presence entry - one live, joined connection

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Identity;
use crate::value_objects::ConnectionId;

/// A joined connection and the identity it represents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub connection_id: ConnectionId,
    pub identity: Identity,
    pub joined_at: DateTime<Utc>,
}

impl PresenceEntry {
    /// Create a new entry stamped with the current time
    pub fn new(connection_id: ConnectionId, identity: Identity) -> Self {
        Self {
            connection_id,
            identity,
            joined_at: Utc::now(),
        }
    }
}
