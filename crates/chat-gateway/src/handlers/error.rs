//! Handler error types

use crate::engine::EngineError;
use crate::protocol::CloseCode;
use thiserror::Error;

/// Handler error type
///
/// Every variant ends the connection. Rejections the client can recover from
/// (empty message, not joined) never become a `HandlerError`.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload did not match the op's shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Join token missing or rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Lifecycle controller is gone
    #[error("Engine stopped")]
    EngineStopped,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Convert to a close code (if applicable)
    pub fn to_close_code(&self) -> Option<CloseCode> {
        match self {
            Self::InvalidPayload(_) => Some(CloseCode::DecodeError),
            Self::AuthenticationFailed(_) => Some(CloseCode::AuthenticationFailed),
            Self::EngineStopped | Self::Internal(_) => Some(CloseCode::UnknownError),
        }
    }
}

impl From<EngineError> for HandlerError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Stopped => Self::EngineStopped,
            EngineError::Domain(e) => Self::Internal(e.to_string()),
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
