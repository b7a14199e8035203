//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use chat_core::Identity;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Identity with a unique user id
pub fn identity(username: &str) -> Identity {
    Identity::new(format!("user-{}", unique_suffix()), username)
}

/// `newMessage` payload / history item
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: u64,
    pub sender_id: String,
    pub username: String,
    pub content: String,
    pub timestamp: String,
}

/// `activeUsers` entry, `userJoined` / `userLeft` payload
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: String,
    pub username: String,
}

/// `userTyping` / `userStoppedTyping` payload
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct TypingResponse {
    pub id: String,
    pub username: String,
}

/// `/health` body
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub connections: usize,
    pub online: usize,
    pub messages: usize,
}

/// Error body of the HTTP routes
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
