//! Message entity - represents a chat message
//!
//! Immutable once built; the message log never edits or removes one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Identity;
use crate::error::DomainError;
use crate::value_objects::{MessageId, UserId};

/// Message entity
///
/// Serializes to the `newMessage` payload:
/// `{id, senderId, username, content, timestamp}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub username: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new Message stamped with the current time
    ///
    /// Content must already have passed [`validate_content`].
    pub fn new(id: MessageId, sender: &Identity, content: String) -> Self {
        Self {
            id,
            sender_id: sender.user_id.clone(),
            username: sender.username.clone(),
            content,
            timestamp: Utc::now(),
        }
    }

    /// Build the sender identity back from the message
    pub fn sender(&self) -> Identity {
        Identity::new(self.sender_id.clone(), self.username.clone())
    }
}

/// Reject content that is empty after trimming whitespace
pub fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::InvalidMessage);
    }
    Ok(())
}
