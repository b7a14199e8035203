//! # chat-state
//!
//! In-memory state of the single chat room.
//!
//! ## Features
//!
//! - **Presence**: which identity each joined connection represents
//! - **History**: append-only, ordered message log
//! - **Typing**: ephemeral per-identity typing flags
//!
//! All three are wrapped in [`RoomState`], which the lifecycle controller mutates
//! from its single control path and which anyone may read concurrently.
//!
//! ## Example
//!
//! ```ignore
//! use chat_state::RoomState;
//!
//! let room = RoomState::new_shared();
//! room.presence().write().join(connection_id, identity);
//! let online = room.snapshot();
//! ```

pub mod history;
pub mod presence;
pub mod typing;

mod room;

pub use history::MessageLog;
pub use presence::PresenceRegistry;
pub use room::{RoomState, SharedRoomState};
pub use typing::TypingTracker;
