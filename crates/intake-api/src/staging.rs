//! Multipart decoding and staging
//!
//! The `file` field is streamed chunk by chunk into the staging directory so a
//! large upload never sits in memory. What comes out is an [`UploadRequestParts`]
//! pointing at the staged copy, plus the optional `name` and `extension` fields.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use intake_core::AppError;
use intake_storage::UploadRequestParts;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// A file spooled into the staging directory
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged copy if it is still there
    pub async fn remove(self) {
        if let Err(e) = fs::remove_file(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove staged file"
                );
            }
        }
    }
}

/// Decoded upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub parts: UploadRequestParts,
    pub staged: Option<StagedFile>,
    pub name: Option<String>,
    pub extension: Option<String>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Read every field of the form, staging the `file` field on disk.
///
/// Only one field named "file" is accepted. On error any staged file has already
/// been removed.
pub async fn read_upload_form(
    mut multipart: Multipart,
    staging_dir: &Path,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    let result = read_fields(&mut multipart, staging_dir, &mut form).await;
    if let Err(err) = result {
        if let Some(staged) = form.staged.take() {
            staged.remove().await;
        }
        return Err(err);
    }

    Ok(form)
}

async fn read_fields(
    multipart: &mut Multipart,
    staging_dir: &Path,
    form: &mut UploadForm,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if form.staged.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                form.parts.original_name = field.file_name().map(|s| s.to_string());
                form.parts.declared_mime_type = field.content_type().map(|s| s.to_string());

                let path = staging_dir.join(format!("{}.part", Uuid::new_v4()));
                // Registered before writing so a failed spool is cleaned up
                form.staged = Some(StagedFile { path: path.clone() });
                let size = spool_field(field, &path).await?;

                form.parts.temporary_location = Some(path);
                form.parts.size_bytes = Some(size);
            }
            "name" => form.name = Some(text_field(field).await?),
            "extension" => form.extension = Some(text_field(field).await?),
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(())
}

async fn spool_field(mut field: Field<'_>, path: &Path) -> Result<u64, AppError> {
    let mut file = fs::File::create(path).await?;
    let mut size: u64 = 0;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;

    tracing::debug!(path = %path.display(), size_bytes = size, "Upload staged");
    Ok(size)
}

async fn text_field(field: Field<'_>) -> Result<String, AppError> {
    let value = field.text().await.map_err(multipart_error)?;
    Ok(value.trim().to_string())
}
