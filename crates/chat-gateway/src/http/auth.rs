//! Authentication extractor
//!
//! Extracts and validates JWT tokens from the Authorization header.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chat_core::Identity;

use super::ApiError;
use crate::server::GatewayState;

/// Caller identity taken from a verified bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: Identity,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    GatewayState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let gateway_state = GatewayState::from_ref(state);

        let claims = gateway_state.jwt().verify_token(bearer.token()).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            ApiError::from(e)
        })?;

        Ok(Self {
            identity: claims.identity(),
        })
    }
}
