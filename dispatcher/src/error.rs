//! Error types for the dispatcher service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Service-level errors (registration, request validation).
///
/// Dispatch failures themselves are not errors at this level: they are
/// normalized into the `ExecuteResult` shape and mapped to HTTP status
/// codes by the execute route.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("handler '{handler_id}' declares unknown capability '{capability_id}'")]
    UnknownCapability {
        handler_id: String,
        capability_id: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Error::UnknownCapability { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "unknown_capability")
            }
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
