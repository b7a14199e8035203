//! Engine error types

use chat_core::DomainError;
use thiserror::Error;

/// Errors seen by callers of the engine handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The transition was rejected
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The controller task is gone
    #[error("Engine is not running")]
    Stopped,
}

impl EngineError {
    /// Domain error, if that is what this is
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Stopped => None,
        }
    }
}
