//! Typing indicator module

mod tracker;

pub use tracker::TypingTracker;
