//! Error types for request handlers.
//!
//! [`AppError`] bridges between domain failures and HTTP responses,
//! implementing Axum's `IntoResponse`. The taxonomy follows the service
//! contract: validation failures and already-minted conflicts map to 400,
//! missing resources to 404, authorization failures to 403, and upstream
//! mint failures to 500 with the gateway message passed through.

use crate::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Application error type for request handlers.
///
/// Errors are caught at the handler boundary and converted into a JSON body
/// with a human-readable message; none are retried, none crash the process.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for logging and client error handling)
    code: &'static str,
    /// Upstream/internal detail, exposed in the `error` field
    detail: Option<String>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            detail: None,
        }
    }

    /// Attach upstream/internal detail, surfaced as the `error` body field.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Create a 400 validation failure.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "VALIDATION_FAILED")
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED")
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into(), "FORBIDDEN")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND",
        )
    }

    /// Create a conflict error (reported as 400, e.g. already-minted).
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "CONFLICT")
    }

    /// Create a 500 upstream-failure error with the gateway message attached.
    #[must_use]
    pub fn upstream(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "UPSTREAM_FAILURE",
        )
        .with_detail(detail)
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_ERROR",
        )
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Error response body (JSON), matching the `{message, error?}` contract.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Human-readable error message.
    message: String,
    /// Upstream/internal detail when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = self.code,
                message = %self.message,
                detail = self.detail.as_deref().unwrap_or(""),
                "Request failed"
            );
        }

        let body = ErrorBody {
            message: self.message,
            error: self.detail,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::internal("Server error").with_detail(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("Server error").with_detail(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let err = AppError::validation("Event name must be at least 3 characters");
        assert_eq!(
            err.to_string(),
            "[VALIDATION_FAILED] Event name must be at least 3 characters"
        );
    }

    #[test]
    fn not_found_formats_resource_and_id() {
        let err = AppError::not_found("Event", "123");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "[NOT_FOUND] Event with id 123 not found");
    }

    #[test]
    fn conflict_is_reported_as_bad_request() {
        let err = AppError::conflict("Participant already minted");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "CONFLICT");
    }

    #[test]
    fn upstream_carries_gateway_detail() {
        let err = AppError::upstream("Mint failed", "cluster unreachable");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "UPSTREAM_FAILURE");
    }
}
