//! Storage root configuration

use intake_core::{Config, PlatformLimits};
use std::path::{Path, PathBuf};

use crate::error::{UploadError, UploadResult};
use crate::paths;

/// Base upload directory plus the default size limit for uploads
///
/// Built once at startup and shared read-only (usually behind an `Arc`) by every
/// ingestor in the process.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    upload_dir: PathBuf,
    max_upload_size_override: Option<u64>,
    platform_limits: PlatformLimits,
}

impl StorageRoot {
    /// Create a storage root using the default platform limits
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_upload_size_override: None,
            platform_limits: PlatformLimits::default(),
        }
    }

    /// Replace the platform-derived default limit with a fixed byte count
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size_override = Some(bytes);
        self
    }

    pub fn with_platform_limits(mut self, limits: PlatformLimits) -> Self {
        self.platform_limits = limits;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            upload_dir: config.upload_dir().to_path_buf(),
            max_upload_size_override: config.max_upload_size(),
            platform_limits: config.platform_limits().clone(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn platform_limits(&self) -> &PlatformLimits {
        &self.platform_limits
    }

    pub fn max_upload_size_override(&self) -> Option<u64> {
        self.max_upload_size_override
    }

    /// Limit applied when an upload config does not set its own
    pub fn default_limit(&self) -> u64 {
        self.max_upload_size_override
            .unwrap_or_else(|| self.platform_limits.effective_limit())
    }

    /// Resolve a relative path under the root
    ///
    /// Rejects absolute paths and `..` segments so the result always stays inside
    /// the upload directory.
    pub fn resolve(&self, relative: &str) -> UploadResult<PathBuf> {
        if relative.is_empty() {
            return Ok(self.upload_dir.clone());
        }
        paths::validate_subdirectory(relative)?;
        Ok(self.upload_dir.join(relative))
    }

    /// Resolve a path under the root and check it does not escape through symlinks
    ///
    /// The target may not exist yet. Its deepest existing ancestor is canonicalized
    /// and must sit inside the canonical root, so nothing is ever created through a
    /// link that points elsewhere. The root itself must exist.
    pub fn resolve_contained(&self, relative: &str) -> UploadResult<PathBuf> {
        let path = self.resolve(relative)?;

        let root_canonical =
            self.upload_dir
                .canonicalize()
                .map_err(|source| UploadError::StorageUnavailable {
                    path: self.upload_dir.clone(),
                    source,
                })?;
        let existing = path
            .ancestors()
            .find_map(|ancestor| ancestor.canonicalize().ok())
            .ok_or_else(|| UploadError::InvalidPath(format!("{} has no existing ancestor", relative)))?;

        if existing.strip_prefix(&root_canonical).is_err() {
            return Err(UploadError::InvalidPath(format!(
                "{} resolves outside the storage root",
                relative
            )));
        }

        Ok(path)
    }
}
