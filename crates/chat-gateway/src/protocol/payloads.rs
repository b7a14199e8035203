//! Payload definitions
//!
//! Client payloads deserialize leniently: identity fields repeated by the
//! client are optional because the engine attributes actions to the
//! identity registered at join.

use chat_core::{DomainError, Identity, UserId};
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    /// Create a Hello payload with the given interval
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

/// Payload for op 2 (Join)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub user_id: UserId,
    pub username: String,
    /// Bearer token from the identity service, checked only when required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl JoinPayload {
    /// Identity claimed by this join
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id.clone(), self.username.clone())
    }

    /// Token with any `Bearer ` prefix removed
    #[must_use]
    pub fn bare_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(|token| token.strip_prefix("Bearer ").unwrap_or(token))
    }
}

/// Payload for op 3 (SendMessage)
///
/// A missing `content` reads as empty and is rejected by the message log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl SendMessagePayload {
    /// Identity repeated by the client, if complete
    #[must_use]
    pub fn claimed(&self) -> Option<Identity> {
        match (&self.user_id, &self.username) {
            (Some(user_id), Some(username)) => Some(Identity::new(user_id.clone(), username.clone())),
            _ => None,
        }
    }
}

/// Payload for ops 4 and 5 (Typing / StopTyping)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypingPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl TypingPayload {
    /// Identity repeated by the client, if complete
    #[must_use]
    pub fn claimed(&self) -> Option<Identity> {
        match (&self.id, &self.username) {
            (Some(id), Some(username)) => Some(Identity::new(id.clone(), username.clone())),
            _ => None,
        }
    }
}

/// Payload for op 8 (Error)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl From<&DomainError> for ErrorPayload {
    fn from(err: &DomainError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
