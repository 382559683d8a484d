//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use warden_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message. Omitted for credential failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Handler error: an [`AppError`] that knows how to render itself.
///
/// Every credential or token failure renders as the same 401 body, so a
/// caller cannot tell an unknown refresh token from a replayed one.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self.0.kind {
            kind if kind.is_unauthorized() => StatusCode::UNAUTHORIZED,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = self.0;

        let body = match err.kind {
            kind if kind.is_unauthorized() => {
                tracing::debug!(kind = %kind, reason = %err.message, "Request unauthorized");
                ApiErrorResponse {
                    error: "unauthorized".to_string(),
                    message: None,
                }
            }
            ErrorKind::Validation => ApiErrorResponse {
                error: "validation_error".to_string(),
                message: Some(err.message),
            },
            ErrorKind::BadRequest => ApiErrorResponse {
                error: "bad_request".to_string(),
                message: Some(err.message),
            },
            ErrorKind::NotFound => ApiErrorResponse {
                error: "not_found".to_string(),
                message: Some(err.message),
            },
            kind => {
                tracing::error!(
                    kind = %kind,
                    error = %err.message,
                    source = ?err.source,
                    "Internal server error"
                );
                ApiErrorResponse {
                    error: "internal_error".to_string(),
                    message: Some("The server encountered an internal error".to_string()),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
