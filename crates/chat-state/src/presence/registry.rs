//! Presence registry - connection to identity mapping
//!
//! Entries are keyed by connection, never by user: two tabs with the same
//! user id are two entries. Snapshots list identities in join order.

use std::collections::HashMap;

use chat_core::{ConnectionId, Identity, PresenceEntry, UserId};
use tracing::debug;

/// Registry slot: the entry plus its join sequence number
#[derive(Debug, Clone)]
struct Slot {
    entry: PresenceEntry,
    seq: u64,
}

/// Presence registry
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    slots: HashMap<ConnectionId, Slot>,
    next_seq: u64,
}

impl PresenceRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `identity` for `connection_id`
    ///
    /// Joining again with the same connection replaces the identity in place:
    /// the entry keeps its join position and `joined_at`. Returns the identity
    /// it replaced, if any.
    pub fn join(&mut self, connection_id: ConnectionId, identity: Identity) -> Option<Identity> {
        if let Some(slot) = self.slots.get_mut(&connection_id) {
            let previous = std::mem::replace(&mut slot.entry.identity, identity);
            debug!(
                connection_id = %connection_id,
                user_id = %slot.entry.identity.user_id,
                "Presence entry replaced"
            );
            return Some(previous);
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        debug!(
            connection_id = %connection_id,
            user_id = %identity.user_id,
            "Presence entry added"
        );
        self.slots.insert(
            connection_id.clone(),
            Slot {
                entry: PresenceEntry::new(connection_id, identity),
                seq,
            },
        );
        None
    }

    /// Remove the entry for `connection_id`
    ///
    /// Returns the identity that was registered, or `None` when the connection
    /// never joined (or already left).
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<Identity> {
        let slot = self.slots.remove(connection_id)?;
        debug!(
            connection_id = %connection_id,
            user_id = %slot.entry.identity.user_id,
            "Presence entry removed"
        );
        Some(slot.entry.identity)
    }

    /// All registered identities, in join order
    #[must_use]
    pub fn snapshot(&self) -> Vec<Identity> {
        self.ordered().map(|entry| entry.identity.clone()).collect()
    }

    /// Identity registered for `connection_id`
    #[must_use]
    pub fn identity_of(&self, connection_id: &ConnectionId) -> Option<&Identity> {
        self.slots.get(connection_id).map(|slot| &slot.entry.identity)
    }

    /// Whether any connection represents `user_id`
    #[must_use]
    pub fn has_user(&self, user_id: &UserId) -> bool {
        self.slots
            .values()
            .any(|slot| &slot.entry.identity.user_id == user_id)
    }

    /// Number of joined connections
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nobody is joined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn ordered(&self) -> impl Iterator<Item = &PresenceEntry> {
        let mut slots: Vec<&Slot> = self.slots.values().collect();
        slots.sort_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| &slot.entry)
    }
}
