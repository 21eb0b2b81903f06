//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping internal errors to appropriate HTTP status codes.
//! Dataset-load and agent-construction failures surface here, out of band.
//! Query execution failures never do; the controller folds those into the
//! transcript.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use loglens_chat::ChatError;
use loglens_data::DatasetError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters, unparsable upload.
    BadRequest(String),
    /// 404 Not Found - session or dataset does not exist.
    NotFound(String),
    /// 409 Conflict - operation needs a dataset that is not loaded.
    Conflict(String),
    /// 422 Unprocessable Entity - dataset parsed but no agent can be built.
    UnprocessableEntity(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable_entity", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match &err {
            ChatError::SessionNotFound(_) => ApiError::NotFound(err.to_string()),
            ChatError::DatasetMissing => ApiError::Conflict(err.to_string()),
            ChatError::EmptyMessage
            | ChatError::MessageTooLong(_)
            | ChatError::UnknownExample(_) => ApiError::BadRequest(err.to_string()),
            ChatError::AgentConstruction(_) => ApiError::UnprocessableEntity(err.to_string()),
            ChatError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<DatasetError> for ApiError {
    fn from(err: DatasetError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
