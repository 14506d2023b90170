use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::store::StoreError;
use crate::utils::response::error as error_response;

const NOT_FOUND_MESSAGE: &str = "Event not found";
const INTERNAL_MESSAGE: &str = "An internal server error occurred";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id),
            StoreError::Database(e) => AppError::DatabaseError(e),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show a client. Server faults never leak detail.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg) | AppError::AuthError(msg) => msg.clone(),
            AppError::NotFound(_) => NOT_FOUND_MESSAGE.to_string(),
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                INTERNAL_MESSAGE.to_string()
            }
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg) => debug!(message = %msg, "Rejected invalid request"),
            AppError::AuthError(msg) => warn!(message = %msg, "Rejected unauthenticated request"),
            AppError::NotFound(id) => debug!(id = %id, "Event not found"),
            AppError::DatabaseError(e) => error!(error = ?e, "Database error"),
            AppError::InternalServerError(msg) => error!(message = %msg, "Internal error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        error_response(self.public_message(), self.status_code())
    }
}
