//! Message log - append-only, process-lifetime history
//!
//! Ids are assigned at append time from a counter starting at 1, so the log
//! order and the id order always agree.

use chat_core::{validate_content, DomainError, Identity, Message, MessageIdGenerator};
use tracing::debug;

/// Ordered message log
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
    ids: MessageIdGenerator,
}

impl MessageLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a message from `sender`
    ///
    /// # Errors
    /// Returns `DomainError::InvalidMessage` when `content` is empty after
    /// trimming. Nothing is appended and no id is consumed in that case.
    pub fn append(&mut self, sender: &Identity, content: impl Into<String>) -> Result<Message, DomainError> {
        let content = content.into();
        validate_content(&content)?;

        let message = Message::new(self.ids.generate(), sender, content);
        debug!(
            message_id = %message.id,
            user_id = %message.sender_id,
            "Message appended"
        );
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Full history, in append order
    #[must_use]
    pub fn history(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
