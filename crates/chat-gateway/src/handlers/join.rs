//! Join handler (op 2)

use super::{settle, HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, JoinPayload};
use crate::server::GatewayState;
use std::sync::Arc;

/// Handles Join messages
pub struct JoinHandler;

impl JoinHandler {
    /// Handle a Join message
    ///
    /// When join tokens are required the token's subject must match the
    /// claimed `userId`; otherwise the claimed identity is taken as is.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: JoinPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        if payload.user_id.is_empty() {
            return Err(HandlerError::InvalidPayload("userId must not be empty".to_string()));
        }

        if state.config().gateway.require_join_token {
            Self::verify(state, connection, &payload)?;
        }

        let result = state
            .engine()
            .join(connection.id().clone(), payload.identity())
            .await;

        settle(connection, "Join", result)
    }

    fn verify(state: &GatewayState, connection: &Arc<Connection>, payload: &JoinPayload) -> HandlerResult<()> {
        let token = payload
            .bare_token()
            .ok_or_else(|| HandlerError::AuthenticationFailed("Join token missing".to_string()))?;

        state.jwt().verify_for(token, &payload.user_id).map_err(|e| {
            tracing::debug!(
                connection_id = %connection.id(),
                user_id = %payload.user_id,
                error = %e,
                "Join token rejected"
            );
            HandlerError::AuthenticationFailed(e.to_string())
        })?;

        Ok(())
    }
}
