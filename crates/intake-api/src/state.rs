//! Shared application state.

use intake_core::Config;
use intake_storage::{StorageRoot, UploadConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub root: Arc<StorageRoot>,
    /// Constraints applied by `POST /api/uploads`
    pub upload_config: UploadConfig,
    pub staging_dir: PathBuf,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let root = Arc::new(StorageRoot::from_config(&config));
        let upload_config = UploadConfig::new(config.upload_subdirectory())
            .with_max_file_size(config.max_file_size_bytes())
            .with_allowed_mime_types(config.allowed_content_types().iter().cloned());
        let staging_dir = config.staging_dir().to_path_buf();

        Self {
            config,
            root,
            upload_config,
            staging_dir,
        }
    }
}
