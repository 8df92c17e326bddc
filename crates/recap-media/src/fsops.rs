//! Filesystem helpers shared by render operations.

use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::error::MediaResult;

/// Create a directory (and parents) if it does not exist.
pub async fn ensure_dir(path: impl AsRef<Path>) -> MediaResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("Creating directory: {}", path.display());
        fs::create_dir_all(path).await?;
    }
    Ok(())
}

/// Replace `dest` with `src`, falling back to copy+delete when rename fails
/// (e.g. across filesystems, which is the normal case for tempdir staging).
pub async fn replace_file(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    if fs::rename(src, dest).await.is_err() {
        debug!(
            "Rename {} -> {} failed, copying instead",
            src.display(),
            dest.display()
        );
        fs::copy(src, dest).await?;
        fs::remove_file(src).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_dir_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).await.unwrap();
        ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_replace_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("new.mp4");
        let dest = dir.path().join("old.mp4");
        fs::write(&src, b"new").await.unwrap();
        fs::write(&dest, b"old").await.unwrap();

        replace_file(&src, &dest).await.unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).await.unwrap(), b"new");
    }
}
