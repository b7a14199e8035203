//! Identity entity - who a connection claims to be

use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// Identity supplied by the external identity service
///
/// Wire shape: `{"userId": "...", "username": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

impl Identity {
    /// Create a new Identity
    pub fn new(user_id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.username, self.user_id)
    }
}
