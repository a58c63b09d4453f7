//! Upload request, configuration, and result types

use serde::Serialize;
use std::path::PathBuf;

use crate::error::UploadError;

/// One inbound file submission
///
/// Built once at the HTTP boundary (or by the CLI) from a file that has already
/// been written to staging storage. The declared MIME type comes from the client
/// and is not verified against the file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Filename as sent by the client
    pub original_name: String,
    /// Where the submitted bytes currently sit
    pub temporary_location: PathBuf,
    /// Client-supplied content type
    pub declared_mime_type: String,
    /// Size of the submitted file in bytes
    pub size_bytes: u64,
}

impl UploadRequest {
    pub fn new(
        original_name: impl Into<String>,
        temporary_location: impl Into<PathBuf>,
        declared_mime_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            temporary_location: temporary_location.into(),
            declared_mime_type: declared_mime_type.into(),
            size_bytes,
        }
    }
}

/// A submission as decoded from the wire, where any field may be missing
///
/// Converting into an [`UploadRequest`] fails with
/// [`UploadError::MalformedRequest`] naming every missing field.
#[derive(Debug, Clone, Default)]
pub struct UploadRequestParts {
    pub original_name: Option<String>,
    pub temporary_location: Option<PathBuf>,
    pub declared_mime_type: Option<String>,
    pub size_bytes: Option<u64>,
}

impl TryFrom<UploadRequestParts> for UploadRequest {
    type Error = UploadError;

    fn try_from(parts: UploadRequestParts) -> Result<Self, Self::Error> {
        match parts {
            UploadRequestParts {
                original_name: Some(original_name),
                temporary_location: Some(temporary_location),
                declared_mime_type: Some(declared_mime_type),
                size_bytes: Some(size_bytes),
            } => Ok(UploadRequest {
                original_name,
                temporary_location,
                declared_mime_type,
                size_bytes,
            }),
            parts => {
                let mut missing = Vec::new();
                if parts.original_name.is_none() {
                    missing.push("original_name");
                }
                if parts.temporary_location.is_none() {
                    missing.push("temporary_location");
                }
                if parts.declared_mime_type.is_none() {
                    missing.push("declared_mime_type");
                }
                if parts.size_bytes.is_none() {
                    missing.push("size_bytes");
                }
                Err(UploadError::MalformedRequest { missing })
            }
        }
    }
}

/// Per-call upload constraints
///
/// - `max_file_size_bytes == 0` means "use the storage root's default limit"
/// - an empty `allowed_mime_types` skips MIME validation entirely
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadConfig {
    pub max_file_size_bytes: u64,
    pub allowed_mime_types: Vec<String>,
    pub storage_subdirectory: String,
}

impl UploadConfig {
    pub fn new(storage_subdirectory: impl Into<String>) -> Self {
        Self {
            storage_subdirectory: storage_subdirectory.into(),
            ..Default::default()
        }
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    pub fn with_allowed_mime_types<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_mime_types = mime_types.into_iter().map(Into::into).collect();
        self
    }
}

/// A file that has been moved into the storage root
///
/// The absolute path is never serialized; only the relative path and the
/// generated name leave the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    #[serde(skip)]
    pub absolute_path: PathBuf,
    pub relative_path: String,
    pub generated_name: String,
}

impl StoredFile {
    /// Public URL for the file under a static file route
    pub fn public_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.relative_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_with_all_fields_convert() {
        let parts = UploadRequestParts {
            original_name: Some("photo.png".to_string()),
            temporary_location: Some(PathBuf::from("/tmp/staging/abc.part")),
            declared_mime_type: Some("image/png".to_string()),
            size_bytes: Some(42),
        };
        let request = UploadRequest::try_from(parts).unwrap();
        assert_eq!(
            request,
            UploadRequest::new("photo.png", "/tmp/staging/abc.part", "image/png", 42)
        );
    }

    #[test]
    fn test_parts_report_every_missing_field() {
        let parts = UploadRequestParts {
            original_name: Some("photo.png".to_string()),
            size_bytes: Some(42),
            ..Default::default()
        };
        match UploadRequest::try_from(parts) {
            Err(UploadError::MalformedRequest { missing }) => {
                assert_eq!(missing, vec!["temporary_location", "declared_mime_type"]);
            }
            other => panic!("Expected MalformedRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_parts_are_malformed() {
        let result = UploadRequest::try_from(UploadRequestParts::default());
        assert!(matches!(
            result,
            Err(UploadError::MalformedRequest { ref missing }) if missing.len() == 4
        ));
    }

    #[test]
    fn test_upload_config_builder() {
        let config = UploadConfig::new("avatars")
            .with_max_file_size(1_000_000)
            .with_allowed_mime_types(["image/png", "image/jpeg"]);
        assert_eq!(config.storage_subdirectory, "avatars");
        assert_eq!(config.max_file_size_bytes, 1_000_000);
        assert_eq!(config.allowed_mime_types, vec!["image/png", "image/jpeg"]);
    }

    #[test]
    fn test_stored_file_serialization_omits_absolute_path() {
        let stored = StoredFile {
            absolute_path: PathBuf::from("/srv/uploads/avatars/a_1.png"),
            relative_path: "avatars/a_1.png".to_string(),
            generated_name: "a_1.png".to_string(),
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["relative_path"], "avatars/a_1.png");
        assert_eq!(json["generated_name"], "a_1.png");
        assert!(json.get("absolute_path").is_none());
    }

    #[test]
    fn test_public_url() {
        let stored = StoredFile {
            absolute_path: PathBuf::from("/srv/uploads/avatars/a_1.png"),
            relative_path: "avatars/a_1.png".to_string(),
            generated_name: "a_1.png".to_string(),
        };
        assert_eq!(
            stored.public_url("http://localhost:8080/uploads/"),
            "http://localhost:8080/uploads/avatars/a_1.png"
        );
    }
}
