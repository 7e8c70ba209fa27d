//! Health check endpoint.

use axum::http::StatusCode;

/// Liveness probe. Does not check dependencies.
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
