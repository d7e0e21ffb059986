//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<T, AppError>`; any [`hls_sink_common::Error`]
//! converts with `?`. Failures stay confined to their own request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: hls_sink_common::Error,
}

impl AppError {
    pub fn new(inner: hls_sink_common::Error) -> Self {
        Self { inner }
    }
}

impl From<hls_sink_common::Error> for AppError {
    fn from(e: hls_sink_common::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Error saving file"
            );
        } else {
            tracing::warn!(status = %status, error = %self.inner, "Rejected artifact");
        }

        let body = json!({
            "error": format!("Error saving file: {}", self.inner),
            "code": self.inner.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}
