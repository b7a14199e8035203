//! Value objects - immutable types that represent domain concepts

mod ids;
mod message_id;

pub use ids::{ConnectionId, UserId};
pub use message_id::{MessageId, MessageIdGenerator};
