//! Error types for the Lectura server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::document::ExtractError;
use crate::summarize::SummaryError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Reading already in progress")]
    ReadingInProgress,

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Summarize(#[from] SummaryError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ReadingInProgress => (
                StatusCode::CONFLICT,
                "Reading already in progress".to_string(),
            ),
            AppError::Extract(e) => match e {
                ExtractError::UnsupportedFormat => (
                    StatusCode::BAD_REQUEST,
                    "Unsupported file format".to_string(),
                ),
                ExtractError::EmptyFile => (StatusCode::BAD_REQUEST, "Empty file".to_string()),
                _ => {
                    tracing::error!("Extraction failed: {}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
            },
            AppError::Summarize(e) => {
                tracing::error!("Summarization failed: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
