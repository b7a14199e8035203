//! Domain errors - error types for the engine
//!
//! Every variant is scoped to the single offending connection; none is fatal.

use thiserror::Error;

use crate::value_objects::ConnectionId;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Rejected locally, reported to the sender only
    // =========================================================================
    #[error("Message content is empty")]
    InvalidMessage,

    #[error("Connection has not joined the room")]
    NotJoined,

    // =========================================================================
    // Treated as a no-op (shutdown races, sends after close)
    // =========================================================================
    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionId),
}

impl DomainError {
    /// Get an error code string for client-facing error payloads
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidMessage => "INVALID_MESSAGE",
            Self::NotJoined => "NOT_JOINED",
            Self::UnknownConnection(_) => "UNKNOWN_CONNECTION",
        }
    }

    /// Check if the error should be dropped silently instead of reported
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::UnknownConnection(_))
    }
}
