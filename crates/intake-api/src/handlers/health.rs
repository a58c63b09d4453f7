//! Health check handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use intake_core::constants::HEALTH_CHECK_TIMEOUT_SECS;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
}

/// `GET /health`: the upload directory must be an existing directory
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let upload_dir = state.root.upload_dir().to_path_buf();
    let storage = run_check(
        Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS),
        async move {
            let metadata = tokio::fs::metadata(&upload_dir).await?;
            if metadata.is_dir() {
                Ok(())
            } else {
                Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "upload path is not a directory",
                ))
            }
        },
        "unavailable",
    )
    .await;

    let healthy = storage == "healthy";
    if !healthy {
        tracing::error!(storage = %storage, "Storage health check failed");
    }

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            storage,
        }),
    )
}
