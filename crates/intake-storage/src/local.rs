use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{UploadError, UploadResult};

/// Create a directory and its parents, treating "already exists" as success
pub(crate) async fn ensure_dir(path: &Path) -> UploadResult<()> {
    match fs::create_dir_all(path).await {
        Ok(()) => Ok(()),
        // Lost a creation race with another ingestor
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(source) => Err(UploadError::StorageUnavailable {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Move a staged file to its final location
///
/// A plain rename is tried first. When that fails for any reason other than a
/// missing source (typically because staging sits on another filesystem), the
/// bytes are copied to a hidden sibling of the destination, synced, and renamed
/// into place, so the destination never holds a partial file.
pub(crate) async fn move_file(from: &Path, to: &Path) -> UploadResult<()> {
    let move_failed = |source: io::Error| UploadError::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    match fs::rename(from, to).await {
        Ok(()) => return Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(move_failed(e)),
        Err(e) => {
            tracing::debug!(
                from = %from.display(),
                to = %to.display(),
                error = %e,
                "Rename failed, falling back to copy"
            );
        }
    }

    let partial = partial_path(to);
    if let Err(e) = copy_into_place(from, &partial, to).await {
        if let Err(cleanup) = fs::remove_file(&partial).await {
            if cleanup.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %partial.display(),
                    error = %cleanup,
                    "Failed to remove partial file"
                );
            }
        }
        return Err(move_failed(e));
    }

    if let Err(e) = fs::remove_file(from).await {
        tracing::warn!(
            path = %from.display(),
            error = %e,
            "Stored file copied but staged original could not be removed"
        );
    }

    Ok(())
}

async fn copy_into_place(from: &Path, partial: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, partial).await?;
    let file = fs::File::open(partial).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(partial, to).await
}

fn partial_path(to: &Path) -> PathBuf {
    let name = to
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    to.with_file_name(format!(".{}.partial", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a/b/c");
        ensure_dir(&target).await.unwrap();
        ensure_dir(&target).await.unwrap();
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_dir_fails_when_blocked_by_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let result = ensure_dir(&blocker.join("sub")).await;
        assert!(matches!(
            result,
            Err(UploadError::StorageUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_move_file_renames() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("staged.part");
        let to = dir.path().join("stored.png");
        std::fs::write(&from, b"payload").unwrap();

        move_file(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(std::fs::read(&to).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_move_missing_source_fails_without_destination() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("gone.part");
        let to = dir.path().join("stored.png");

        let result = move_file(&from, &to).await;

        assert!(matches!(result, Err(UploadError::MoveFailed { .. })));
        assert!(!to.exists());
        assert!(!partial_path(&to).exists());
    }

    #[tokio::test]
    async fn test_move_into_missing_directory_leaves_source() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("staged.part");
        let to = dir.path().join("missing/stored.png");
        std::fs::write(&from, b"payload").unwrap();

        let result = move_file(&from, &to).await;

        assert!(matches!(result, Err(UploadError::MoveFailed { .. })));
        assert!(from.exists());
        assert!(!to.exists());
    }

    #[tokio::test]
    async fn test_copy_fallback_handles_read_only_source() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("staged.part");
        let to = dir.path().join("stored.png");
        std::fs::write(&from, b"payload").unwrap();
        let mut permissions = std::fs::metadata(&from).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&from, permissions).unwrap();

        let partial = partial_path(&to);
        copy_into_place(&from, &partial, &to).await.unwrap();

        assert_eq!(std::fs::read(&to).unwrap(), b"payload");
        assert!(!partial.exists());
    }

    #[test]
    fn test_partial_path_is_hidden_sibling() {
        let to = Path::new("/srv/uploads/avatars/a_1.png");
        assert_eq!(
            partial_path(to),
            PathBuf::from("/srv/uploads/avatars/.a_1.png.partial")
        );
    }
}
