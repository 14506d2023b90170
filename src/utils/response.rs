use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `{"message": ...}` with the given status.
pub fn message(message: impl Into<String>, status: StatusCode) -> Response {
    let body = MessageBody {
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

/// `{"error": ...}` with the given status.
pub fn error(message: impl Into<String>, status: StatusCode) -> Response {
    let body = ErrorBody {
        error: message.into(),
    };
    (status, Json(body)).into_response()
}
