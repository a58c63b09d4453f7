//! Upload endpoint

use axum::{extract::Multipart, extract::State, http::StatusCode, Json};
use intake_core::constants::DEFAULT_BASE_NAME;
use intake_core::AppError;
use intake_storage::{UploadError, UploadIngestor, UploadRequest};
use serde::Serialize;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::staging::read_upload_form;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub relative_path: String,
    pub generated_name: String,
    pub url: String,
}

/// `POST /api/uploads`
///
/// Multipart form with a `file` field and optional `name` and `extension` text
/// fields. The file is stored under the configured subdirectory.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let form = read_upload_form(multipart, &state.staging_dir).await?;

    let Some(staged) = form.staged else {
        return Err(AppError::InvalidInput("No file provided".to_string()).into());
    };
    let base_name = form
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());
    let extension = form.extension.unwrap_or_default();

    match ingest(&state, form.parts.try_into(), &base_name, &extension).await {
        Ok(response) => Ok((StatusCode::CREATED, Json(response))),
        Err(err) => {
            tracing::debug!(path = %staged.path().display(), "Discarding staged upload");
            staged.remove().await;
            Err(err)
        }
    }
}

async fn ingest(
    state: &AppState,
    request: Result<UploadRequest, UploadError>,
    base_name: &str,
    extension: &str,
) -> Result<UploadResponse, HttpAppError> {
    let request = request?;
    let mut ingestor =
        UploadIngestor::new(request, state.upload_config.clone(), state.root.clone())?;
    let stored = ingestor.store_with_extension(base_name, extension).await?;

    Ok(UploadResponse {
        url: stored.public_url(state.config.public_base_url()),
        relative_path: stored.relative_path,
        generated_name: stored.generated_name,
    })
}

