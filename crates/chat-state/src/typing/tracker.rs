//! Typing tracker - who is currently composing
//!
//! Keyed by user id, so two tabs of the same user share one flag.
//! There is no expiry; a flag lives until `stop` or the user's last
//! connection goes away.

use std::collections::HashMap;

use chat_core::{TypingSignal, UserId};
use tracing::debug;

/// Typing tracker
#[derive(Debug, Default)]
pub struct TypingTracker {
    active: HashMap<UserId, TypingSignal>,
}

impl TypingTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `signal.id` as typing
    ///
    /// Returns `true` if the user was not typing before.
    pub fn start(&mut self, signal: TypingSignal) -> bool {
        debug!(user_id = %signal.id, "Typing started");
        self.active.insert(signal.id.clone(), signal).is_none()
    }

    /// Clear the typing flag for `user_id`
    ///
    /// Returns the cleared signal, or `None` if the user was not typing.
    pub fn stop(&mut self, user_id: &UserId) -> Option<TypingSignal> {
        let signal = self.active.remove(user_id)?;
        debug!(user_id = %user_id, "Typing stopped");
        Some(signal)
    }

    /// Everyone currently typing, sorted by user id
    #[must_use]
    pub fn active(&self) -> Vec<TypingSignal> {
        let mut signals: Vec<TypingSignal> = self.active.values().cloned().collect();
        signals.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        signals
    }

    /// Number of users typing
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether nobody is typing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
