//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Both `AppError` and
//! `UploadError` convert into `HttpAppError`, and every error is rendered from its
//! `ErrorMetadata` so status codes, bodies, and log levels stay consistent.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use intake_core::{AppError, ErrorMetadata, LogLevel};
use intake_storage::UploadError;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

static HIDE_ERROR_DETAILS: AtomicBool = AtomicBool::new(false);

/// Set whether error responses omit `details` and `error_type`
///
/// Called once from `initialize_app` with `Config::is_production`.
pub fn set_hide_error_details(hide: bool) {
    HIDE_ERROR_DETAILS.store(hide, Ordering::Relaxed);
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Any error that knows how to present itself over HTTP
#[derive(Debug)]
pub struct HttpAppError(pub Box<dyn ErrorMetadata + Send + Sync>);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(Box::new(err))
    }
}

impl From<UploadError> for HttpAppError {
    fn from(err: UploadError) -> Self {
        HttpAppError(Box::new(err))
    }
}

fn log_error(error: &(dyn ErrorMetadata + Send + Sync)) {
    let error_type = error.error_type();
    let details = error.detailed_message();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %details, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %details, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %details, error_type = error_type, "Error occurred");
        }
    }
}

impl HttpAppError {
    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn body(&self, hide_details: bool) -> ErrorResponse {
        let error = self.0.as_ref();
        let (details, error_type) = if hide_details || error.is_sensitive() {
            (None, None)
        } else {
            (
                Some(error.detailed_message()),
                Some(error.error_type().to_string()),
            )
        };

        ErrorResponse {
            error: error.client_message(),
            details,
            error_type,
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        log_error(self.0.as_ref());
        let body = self.body(HIDE_ERROR_DETAILS.load(Ordering::Relaxed));
        (self.status(), Json(body)).into_response()
    }
}
