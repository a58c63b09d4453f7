//! Name generation and path hygiene for stored files.
//!
//! Generated names have the form `{base}_{token}.{extension}` and relative paths
//! the form `{subdirectory}/{generated_name}`. Every stored file must go through
//! these helpers so the layout stays consistent.

use std::path::{Component, Path};
use uuid::Uuid;

use crate::error::{UploadError, UploadResult};

/// Check that a subdirectory stays below the storage root
pub(crate) fn validate_subdirectory(subdirectory: &str) -> UploadResult<()> {
    if subdirectory.contains('\\') {
        return Err(UploadError::InvalidPath(format!(
            "subdirectory {:?} contains a backslash",
            subdirectory
        )));
    }

    let stays_inside = Path::new(subdirectory)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !stays_inside {
        return Err(UploadError::InvalidPath(format!(
            "subdirectory {:?} must be relative and must not contain '..'",
            subdirectory
        )));
    }

    Ok(())
}

/// Check a single file name segment (base name or extension)
pub(crate) fn validate_segment(kind: &str, segment: &str) -> UploadResult<()> {
    if segment.contains('/') || segment.contains('\\') || segment.contains('\0') {
        return Err(UploadError::InvalidPath(format!(
            "{} {:?} contains a path separator",
            kind, segment
        )));
    }
    if segment == "." || segment == ".." {
        return Err(UploadError::InvalidPath(format!(
            "{} {:?} is not a file name",
            kind, segment
        )));
    }
    Ok(())
}

/// Extension of the original filename: everything after the last `.`
///
/// Fails when there is no dot or the segment after it is empty.
pub(crate) fn derive_extension(original_name: &str) -> UploadResult<&str> {
    match original_name.rsplit_once('.') {
        Some((_, extension)) if !extension.is_empty() => Ok(extension),
        _ => Err(UploadError::InvalidExtension {
            original_name: original_name.to_string(),
        }),
    }
}

/// Compose a collision-resistant file name from a base name and extension
pub(crate) fn generate_name(base_name: &str, extension: &str) -> String {
    format!("{}_{}.{}", base_name, Uuid::new_v4().simple(), extension)
}

/// Path of a generated file relative to the storage root
pub(crate) fn relative_path(subdirectory: &str, generated_name: &str) -> String {
    let subdirectory = subdirectory.trim_end_matches('/');
    if subdirectory.is_empty() {
        generated_name.to_string()
    } else {
        format!("{}/{}", subdirectory, generated_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_extension_takes_last_segment() {
        assert_eq!(derive_extension("report.final.pdf").unwrap(), "pdf");
        assert_eq!(derive_extension("photo.PNG").unwrap(), "PNG");
    }

    #[test]
    fn test_derive_extension_requires_suffix() {
        assert!(matches!(
            derive_extension("noext"),
            Err(UploadError::InvalidExtension { .. })
        ));
        assert!(matches!(
            derive_extension("trailing."),
            Err(UploadError::InvalidExtension { .. })
        ));
    }

    #[test]
    fn test_dotfile_extension() {
        // ".bashrc" has an empty name before the dot but a non-empty suffix
        assert_eq!(derive_extension(".bashrc").unwrap(), "bashrc");
    }

    #[test]
    fn test_generate_name_format() {
        let name = generate_name("avatar", "png");
        let token = name
            .strip_prefix("avatar_")
            .and_then(|rest| rest.strip_suffix(".png"))
            .unwrap();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_name_is_unique() {
        assert_ne!(generate_name("report", "pdf"), generate_name("report", "pdf"));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("avatars", "a_1.png"), "avatars/a_1.png");
        assert_eq!(relative_path("avatars/", "a_1.png"), "avatars/a_1.png");
        assert_eq!(relative_path("", "a_1.png"), "a_1.png");
    }

    #[test]
    fn test_validate_subdirectory() {
        assert!(validate_subdirectory("avatars").is_ok());
        assert!(validate_subdirectory("users/42/avatars").is_ok());
        assert!(validate_subdirectory("./avatars").is_ok());
        assert!(validate_subdirectory("../avatars").is_err());
        assert!(validate_subdirectory("avatars/../../etc").is_err());
        assert!(validate_subdirectory("/etc").is_err());
        assert!(validate_subdirectory("a\\b").is_err());
    }

    #[test]
    fn test_validate_segment() {
        assert!(validate_segment("base name", "avatar").is_ok());
        assert!(validate_segment("base name", "my.avatar").is_ok());
        assert!(validate_segment("base name", "a/b").is_err());
        assert!(validate_segment("extension", "png\\x").is_err());
        assert!(validate_segment("base name", "..").is_err());
    }
}
