use std::sync::Arc;

use axum::{extract::{rejection::JsonRejection, State}, http::StatusCode, Json};

use crate::{
    dto::{Credentials, MessageResponse, TokenResponse},
    error::AppError,
    server_state::ServerState,
};

pub async fn health() -> Json<MessageResponse> {
    Json(MessageResponse::new("Mileage Tracker API is running"))
}

pub async fn register(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(credentials) = payload?;
    let (email, password) = credentials.present().ok_or(AppError::MissingCredentials)?;

    let password_hash = state.passwords.hash(password).await?;
    state.data_manager.register_user(email, &password_hash).await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("User registered successfully."))))
}

pub async fn login(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(credentials) = payload?;
    let (email, password) = credentials.present().ok_or(AppError::InvalidCredentials)?;

    let Some(user) = state.data_manager.find_user(email).await? else {
        tracing::debug!("Login for unknown email {}", email);
        return Err(AppError::InvalidCredentials);
    };

    if !state.passwords.verify(password, &user.password_hash).await? {
        tracing::debug!("Wrong password for user {}", user.user_id);
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.user_id)?;
    tracing::info!("User {} logged in", user.user_id);

    Ok(Json(TokenResponse { token }))
}
