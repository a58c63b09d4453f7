//! Validate-then-store pipeline for a single uploaded file

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{UploadError, UploadResult};
use crate::local;
use crate::paths;
use crate::root::StorageRoot;
use crate::types::{StoredFile, UploadConfig, UploadRequest};

#[derive(Debug)]
enum IngestState {
    Validated,
    Stored(StoredFile),
}

/// Handles exactly one upload
///
/// Construction runs every check that does not touch the filesystem (MIME
/// allow-list and size limit), so a rejected request has no side effects. A
/// validated ingestor can then be stored once; a second `store` fails with
/// [`UploadError::InvalidState`].
///
/// ```no_run
/// # use std::sync::Arc;
/// # use intake_storage::{StorageRoot, UploadConfig, UploadIngestor, UploadRequest};
/// # async fn run() -> intake_storage::UploadResult<()> {
/// let root = Arc::new(StorageRoot::new("/srv/uploads"));
/// let request = UploadRequest::new("me.png", "/tmp/staging/abc.part", "image/png", 500_000);
/// let config = UploadConfig::new("avatars")
///     .with_max_file_size(1_000_000)
///     .with_allowed_mime_types(["image/png"]);
///
/// let mut ingestor = UploadIngestor::new(request, config, root)?;
/// let stored = ingestor.store_with_extension("avatar", "png").await?;
/// println!("{}", stored.relative_path);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct UploadIngestor {
    request: UploadRequest,
    config: UploadConfig,
    root: Arc<StorageRoot>,
    state: IngestState,
}

impl UploadIngestor {
    /// Validate a request against a config and the storage root's default limit
    pub fn new(
        request: UploadRequest,
        config: UploadConfig,
        root: Arc<StorageRoot>,
    ) -> UploadResult<Self> {
        if !config.allowed_mime_types.is_empty()
            && !config
                .allowed_mime_types
                .iter()
                .any(|allowed| allowed == &request.declared_mime_type)
        {
            return Err(UploadError::UnsupportedMediaType {
                actual: request.declared_mime_type,
                allowed: config.allowed_mime_types,
            });
        }

        let limit = effective_limit(&config, &root);
        // A file exactly at the limit is rejected
        if request.size_bytes >= limit {
            return Err(UploadError::FileTooLarge {
                size: request.size_bytes,
                limit,
            });
        }

        Ok(Self {
            request,
            config,
            root,
            state: IngestState::Validated,
        })
    }

    /// Store the file, deriving the extension from the original filename
    pub async fn store(&mut self, base_name: &str) -> UploadResult<StoredFile> {
        self.store_with_extension(base_name, "").await
    }

    /// Store the file as `{base_name}_{token}.{extension}` under the configured subdirectory
    ///
    /// An empty `extension` means "derive it from the original filename".
    pub async fn store_with_extension(
        &mut self,
        base_name: &str,
        extension: &str,
    ) -> UploadResult<StoredFile> {
        if let IngestState::Stored(_) = self.state {
            return Err(UploadError::InvalidState("file has already been stored"));
        }

        let start = Instant::now();
        let subdirectory = self.config.storage_subdirectory.trim_end_matches('/');

        paths::validate_segment("base name", base_name)?;
        // Reject malformed subdirectories before touching the filesystem
        self.root.resolve(subdirectory)?;
        local::ensure_dir(self.root.upload_dir()).await?;
        let target_dir = self.root.resolve_contained(subdirectory)?;
        local::ensure_dir(&target_dir).await?;

        let extension = if extension.is_empty() {
            paths::derive_extension(&self.request.original_name)?
        } else {
            extension
        };
        paths::validate_segment("extension", extension)?;

        let generated_name = paths::generate_name(base_name, extension);
        let relative_path = paths::relative_path(subdirectory, &generated_name);
        let absolute_path = target_dir.join(&generated_name);

        local::move_file(&self.request.temporary_location, &absolute_path).await?;

        tracing::info!(
            path = %absolute_path.display(),
            key = %relative_path,
            content_type = %self.request.declared_mime_type,
            size_bytes = self.request.size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload stored"
        );

        let stored = StoredFile {
            absolute_path,
            relative_path,
            generated_name,
        };
        self.state = IngestState::Stored(stored.clone());
        Ok(stored)
    }

    /// The stored file, once `store` has succeeded
    pub fn stored(&self) -> Option<&StoredFile> {
        match &self.state {
            IngestState::Stored(stored) => Some(stored),
            IngestState::Validated => None,
        }
    }

    pub fn is_stored(&self) -> bool {
        self.stored().is_some()
    }

    /// Absolute path of the stored file; for local filesystem work only
    pub fn absolute_path(&self) -> Option<&Path> {
        self.stored().map(|s| s.absolute_path.as_path())
    }

    pub fn relative_path(&self) -> Option<&str> {
        self.stored().map(|s| s.relative_path.as_str())
    }

    pub fn request(&self) -> &UploadRequest {
        &self.request
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Size limit this upload was validated against
    pub fn effective_limit(&self) -> u64 {
        effective_limit(&self.config, &self.root)
    }
}

fn effective_limit(config: &UploadConfig, root: &StorageRoot) -> u64 {
    if config.max_file_size_bytes > 0 {
        config.max_file_size_bytes
    } else {
        root.default_limit()
    }
}
