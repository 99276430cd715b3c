use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, server_state::ServerState};

pub mod password;
pub mod token;

/// The owner a request acts for, taken from its bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

impl FromRequestParts<Arc<ServerState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<ServerState>) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(AUTHORIZATION).ok_or(AppError::MissingToken)?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AppError::InvalidToken)?;

        let claims = state.tokens.verify(token).map_err(|err| {
            tracing::debug!("Rejected token: {}", err);
            AppError::InvalidToken
        })?;

        Ok(AuthUser { user_id: claims.sub })
    }
}
