//! Typing signal - transient "is composing" indicator

use serde::{Deserialize, Serialize};

use super::Identity;
use crate::value_objects::UserId;

/// Typing signal for one identity
///
/// Wire shape: `{"id": "...", "username": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypingSignal {
    pub id: UserId,
    pub username: String,
}

impl TypingSignal {
    /// Create a new TypingSignal
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

impl From<&Identity> for TypingSignal {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user_id.clone(),
            username: identity.username.clone(),
        }
    }
}
