use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mileage_tracker_data_management::DataManagerError;
use serde_json::json;

use crate::{auth::{password::PasswordError, token::TokenError}, export::ExportError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Email and password required.")]
    MissingCredentials,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("No token provided.")]
    MissingToken,

    #[error("Invalid or expired token.")]
    InvalidToken,

    #[error("Please select both schools.")]
    MissingRoute,

    #[error("No mileage data found for the route {origin} -> {destination}.")]
    RouteNotFound { origin: String, destination: String },

    #[error("Removing all trips requires confirm=true.")]
    ConfirmationRequired,

    #[error("Unsupported export format {0:?}, expected csv or xlsx.")]
    UnsupportedFormat(String),

    #[error("{}", .0.body_text())]
    InvalidJson(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    InvalidQuery(#[from] QueryRejection),

    #[error(transparent)]
    Data(#[from] DataManagerError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCredentials
            | AppError::MissingRoute
            | AppError::ConfirmationRequired
            | AppError::UnsupportedFormat(_)
            | AppError::InvalidJson(_)
            | AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::MissingToken | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Data(err) => match err {
                DataManagerError::Ledger(_) | DataManagerError::EmailTaken(_) => StatusCode::BAD_REQUEST,
                DataManagerError::TripNotFound(_) => StatusCode::NOT_FOUND,
                DataManagerError::Database(_) | DataManagerError::Storage(_) | DataManagerError::DistanceTable(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Password(_) | AppError::Token(_) | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details only go to the log.
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal server error.".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
