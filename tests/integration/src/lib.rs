//! Integration test utilities for the chat server
//!
//! This crate provides helpers for running end-to-end tests against
//! the WebSocket gateway and its HTTP routes.

pub mod fixtures;
pub mod helpers;
pub mod ws;

pub use fixtures::*;
pub use helpers::*;
pub use ws::{Frame, WsClient};
