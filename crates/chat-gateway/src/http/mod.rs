//! HTTP surface next to the gateway
//!
//! Read-only views of the room: message history (token gated) and health.

mod auth;
mod error;
mod handlers;

pub use auth::AuthUser;
pub use error::{ApiError, ApiResult, ErrorBody};
pub use handlers::{health_check, list_messages, HealthResponse};
