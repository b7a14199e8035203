//! HTTP handlers

use axum::{extract::State, Json};
use chat_core::Message;
use serde::Serialize;

use super::{ApiResult, AuthUser};
use crate::server::GatewayState;

/// Full message history, oldest first
///
/// GET /api/messages
pub async fn list_messages(State(state): State<GatewayState>, user: AuthUser) -> ApiResult<Json<Vec<Message>>> {
    let history = state.room().history();

    tracing::debug!(
        user_id = %user.identity.user_id,
        count = history.len(),
        "History requested"
    );

    Ok(Json(history))
}

/// Health check body
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Open transports
    pub connections: usize,
    /// Joined connections
    pub online: usize,
    /// Messages in the log
    pub messages: usize,
}

/// Liveness probe with room counters
///
/// GET /health
pub async fn health_check(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        connections: state.connections().connection_count(),
        online: state.room().online_count(),
        messages: state.room().message_count(),
    })
}
