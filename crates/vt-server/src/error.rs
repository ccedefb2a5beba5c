//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`vt_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on catalog errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Message returned in place of any 5xx error text.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: vt_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: vt_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn inner(&self) -> &vt_core::Error {
        &self.inner
    }
}

impl From<vt_core::Error> for AppError {
    fn from(e: vt_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Database text can describe the schema; only the log sees it.
        let message = if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                request_id = ?self.request_id,
                "Server error in API handler"
            );
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.inner.to_string()
        };

        let body = json!({
            "error": message,
            "code": self.inner.code(),
            "request_id": self.request_id,
        });

        (status, axum::Json(body)).into_response()
    }
}
