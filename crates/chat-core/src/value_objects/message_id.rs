//! Message ID - process-local, strictly increasing message identifier
//!
//! IDs start at 1 and grow by one per appended message. They are unique and
//! order-preserving for the lifetime of the process; nothing survives a restart.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    /// Create a message ID from a raw value
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<MessageId> for u64 {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

/// Thread-safe message ID generator
///
/// Lock-free; every call returns a value strictly greater than all previous ones.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last: AtomicU64,
}

impl MessageIdGenerator {
    /// Create a generator whose first ID is 1
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the next ID
    pub fn generate(&self) -> MessageId {
        MessageId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_id_is_one() {
        let gen = MessageIdGenerator::new();
        assert_eq!(gen.generate(), MessageId::new(1));
        assert_eq!(gen.generate(), MessageId::new(2));
    }

    #[test]
    fn test_generator_ids_are_monotonic() {
        let gen = MessageIdGenerator::new();
        let mut last = MessageId::default();

        for _ in 0..1000 {
            let id = gen.generate();
            assert!(id > last, "IDs should be strictly increasing");
            last = id;
        }
    }

    #[test]
    fn test_generator_thread_safety() {
        let gen = Arc::new(MessageIdGenerator::new());
        let ids = Arc::new(std::sync::Mutex::new(HashSet::new()));
        let mut handles = vec![];

        for _ in 0..4 {
            let gen = Arc::clone(&gen);
            let ids = Arc::clone(&ids);

            handles.push(thread::spawn(move || {
                let local: Vec<_> = (0..500).map(|_| gen.generate()).collect();
                ids.lock().unwrap().extend(local);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ids.lock().unwrap().len(), 2000, "All IDs should be unique");
    }

    #[test]
    fn test_message_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&MessageId::new(7)).unwrap(), "7");
    }
}
