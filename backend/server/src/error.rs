use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("{0}")]
    Validation(String),

    #[error("Email already in use")]
    EmailInUse,

    #[error("User not found")]
    UserNotFound,

    #[error("No users found")]
    NoUsers,

    #[error("Log file not found")]
    LogFileNotFound,

    #[error("Failed to read log file: {0}")]
    LogReadFailure(String),

    #[error("Database error: {0}")]
    Database(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload | AppError::Validation(_) | AppError::EmailInUse => {
                StatusCode::BAD_REQUEST
            }
            AppError::UserNotFound | AppError::NoUsers | AppError::LogFileNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::LogReadFailure(_) | AppError::Database(_) | AppError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
