//! Presence module.
//!
//! Single source of truth for "who is online".

mod registry;

pub use registry::PresenceRegistry;
