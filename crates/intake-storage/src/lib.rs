//! Intake Storage Library
//!
//! This crate validates uploaded files and moves them into the storage root.
//!
//! # Path layout
//!
//! Stored files live at `{storage_root}/{subdirectory}/{base}_{token}.{extension}`,
//! where `token` is a random UUID in simple form. The part after the storage root is
//! the *relative path*: it is what callers persist and later serve. The absolute
//! path is for local filesystem work only.
//!
//! Subdirectories must be relative and must not contain `..`; base names and
//! extensions must not contain path separators. These rules live in the `paths`
//! module.

pub mod error;
pub mod ingestor;
mod local;
pub(crate) mod paths;
pub mod root;
pub mod types;

// Re-export commonly used types
pub use error::{UploadError, UploadResult};
pub use ingestor::UploadIngestor;
pub use root::StorageRoot;
pub use types::{StoredFile, UploadConfig, UploadRequest, UploadRequestParts};
