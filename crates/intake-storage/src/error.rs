//! Upload pipeline errors

use intake_core::{ErrorMetadata, LogLevel};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Upload operation errors
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Malformed upload request: missing {}", .missing.join(", "))]
    MalformedRequest { missing: Vec<&'static str> },

    #[error("Unsupported media type: {actual} (allowed: {allowed:?})")]
    UnsupportedMediaType { actual: String, allowed: Vec<String> },

    #[error("File too large: {size} bytes (limit: {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Storage directory {} unavailable: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No extension given and none derivable from {original_name:?}")]
    InvalidExtension { original_name: String },

    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn upload_error_static_metadata(
    err: &UploadError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        UploadError::MalformedRequest { .. } => (
            400,
            "MALFORMED_REQUEST",
            false,
            Some("Send the file with a filename and content type"),
            false,
            LogLevel::Debug,
        ),
        UploadError::UnsupportedMediaType { .. } => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload a file of an allowed type"),
            false,
            LogLevel::Debug,
        ),
        UploadError::FileTooLarge { .. } => (
            413,
            "FILE_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        UploadError::InvalidExtension { .. } => (
            400,
            "INVALID_EXTENSION",
            false,
            Some("Provide an extension or a filename that has one"),
            false,
            LogLevel::Debug,
        ),
        UploadError::InvalidPath(_) => (
            400,
            "INVALID_PATH",
            false,
            Some("Use names without path separators or '..'"),
            false,
            LogLevel::Warn,
        ),
        UploadError::InvalidState(_) => (
            409,
            "INVALID_STATE",
            false,
            None,
            false,
            LogLevel::Warn,
        ),
        UploadError::StorageUnavailable { .. } => (
            500,
            "STORAGE_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        UploadError::MoveFailed { .. } => (
            500,
            "MOVE_FAILED",
            true,
            Some("Retry the upload"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for UploadError {
    fn http_status_code(&self) -> u16 {
        upload_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        upload_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::StorageUnavailable { .. } | UploadError::MoveFailed { .. } => {
                "Failed to store the uploaded file".to_string()
            }
            other => other.to_string(),
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            UploadError::MalformedRequest { .. } => "MalformedRequest",
            UploadError::UnsupportedMediaType { .. } => "UnsupportedMediaType",
            UploadError::FileTooLarge { .. } => "FileTooLarge",
            UploadError::StorageUnavailable { .. } => "StorageUnavailable",
            UploadError::InvalidExtension { .. } => "InvalidExtension",
            UploadError::MoveFailed { .. } => "MoveFailed",
            UploadError::InvalidState(_) => "InvalidState",
            UploadError::InvalidPath(_) => "InvalidPath",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_request_lists_missing_fields() {
        let err = UploadError::MalformedRequest {
            missing: vec!["original_name", "declared_mime_type"],
        };
        assert_eq!(
            err.to_string(),
            "Malformed upload request: missing original_name, declared_mime_type"
        );
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "MALFORMED_REQUEST");
    }

    #[test]
    fn test_file_too_large_metadata() {
        let err = UploadError::FileTooLarge {
            size: 2000,
            limit: 1000,
        };
        assert_eq!(err.http_status_code(), 413);
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("2000"));
        assert!(err.client_message().contains("1000"));
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_unsupported_media_type_metadata() {
        let err = UploadError::UnsupportedMediaType {
            actual: "text/html".to_string(),
            allowed: vec!["image/png".to_string()],
        };
        assert_eq!(err.http_status_code(), 415);
        assert_eq!(err.error_type(), "UnsupportedMediaType");
        assert!(err.client_message().contains("text/html"));
    }

    #[test]
    fn test_storage_failures_hide_paths() {
        let err = UploadError::MoveFailed {
            from: PathBuf::from("/tmp/staging/abc.part"),
            to: PathBuf::from("/srv/uploads/avatars/a.png"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_sensitive());
        assert!(err.is_recoverable());
        assert!(!err.client_message().contains("/srv"));
        assert!(err.detailed_message().contains("Caused by: denied"));
    }

    #[test]
    fn test_invalid_state_is_conflict() {
        let err = UploadError::InvalidState("already stored");
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_STATE");
    }
}
