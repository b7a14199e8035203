//! Message history module

mod message_log;

pub use message_log::MessageLog;
