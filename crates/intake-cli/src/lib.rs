//! Local ingestion commands behind the `intake` binary.

use anyhow::Context;
use intake_core::constants::DEFAULT_BASE_NAME;
use intake_storage::{StorageRoot, UploadConfig, UploadIngestor, UploadRequest};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Options for ingesting one local file
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub file: PathBuf,
    pub name: Option<String>,
    pub extension: Option<String>,
    pub mime_type: Option<String>,
    pub subdirectory: String,
    pub max_file_size_bytes: u64,
    pub allowed_mime_types: Vec<String>,
}

/// Result of a local ingestion; unlike the API, includes the absolute path
#[derive(Debug, Serialize)]
pub struct IngestReport {
    pub relative_path: String,
    pub generated_name: String,
    pub absolute_path: PathBuf,
    pub size_bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct LimitsReport {
    pub upload_max_filesize: String,
    pub post_max_size: String,
    pub upload_limit_bytes: u64,
    pub post_limit_bytes: u64,
    pub max_upload_size_override: Option<u64>,
    pub default_limit_bytes: u64,
}

pub fn limits_report(root: &StorageRoot) -> LimitsReport {
    let limits = root.platform_limits();
    LimitsReport {
        upload_max_filesize: limits.upload_max_filesize.clone(),
        post_max_size: limits.post_max_size.clone(),
        upload_limit_bytes: limits.upload_limit(),
        post_limit_bytes: limits.post_limit(),
        max_upload_size_override: root.max_upload_size_override(),
        default_limit_bytes: root.default_limit(),
    }
}

/// Copy a file into staging and run it through the ingestor.
///
/// The source file is never modified. The staged copy is removed if ingestion fails.
pub async fn ingest_file(
    root: Arc<StorageRoot>,
    staging_dir: &Path,
    options: IngestOptions,
) -> anyhow::Result<IngestReport> {
    let original_name = options
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", options.file.display()))?;

    tokio::fs::create_dir_all(staging_dir)
        .await
        .with_context(|| format!("Create staging directory {}", staging_dir.display()))?;
    let staged = staging_dir.join(format!("{}.part", Uuid::new_v4()));
    let size_bytes = tokio::fs::copy(&options.file, &staged)
        .await
        .with_context(|| format!("Copy {} into staging", options.file.display()))?;

    tracing::debug!(
        source = %options.file.display(),
        staged = %staged.display(),
        size_bytes,
        "File staged"
    );

    let request = UploadRequest::new(
        original_name,
        staged.clone(),
        options.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE),
        size_bytes,
    );
    let config = UploadConfig::new(options.subdirectory)
        .with_max_file_size(options.max_file_size_bytes)
        .with_allowed_mime_types(options.allowed_mime_types);
    let base_name = options.name.as_deref().unwrap_or(DEFAULT_BASE_NAME);
    let extension = options.extension.as_deref().unwrap_or_default();

    let result = match UploadIngestor::new(request, config, root) {
        Ok(mut ingestor) => ingestor.store_with_extension(base_name, extension).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(stored) => Ok(IngestReport {
            relative_path: stored.relative_path,
            generated_name: stored.generated_name,
            absolute_path: stored.absolute_path,
            size_bytes,
        }),
        Err(err) => {
            if let Err(e) = tokio::fs::remove_file(&staged).await {
                tracing::warn!(path = %staged.display(), error = %e, "Failed to remove staged copy");
            }
            Err(err.into())
        }
    }
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
