use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Create `path` (and any missing parents) unless it already is a directory.
///
/// Returns `true` when the directory was created by this call.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();

    if path.is_dir() {
        return Ok(false);
    }
    if path.exists() {
        return Err(Error::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    fs::create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "created directory");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_missing_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("data");

        assert!(ensure_dir(&target).unwrap());
        assert!(target.is_dir());
    }

    #[test]
    fn creates_missing_parents() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a/b/c");

        assert!(ensure_dir(&target).unwrap());
        assert!(target.is_dir());
    }

    #[test]
    fn existing_directory_is_noop() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("keep.txt"), "x").unwrap();

        assert!(!ensure_dir(dir.path()).unwrap());
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn regular_file_is_rejected() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("data");
        std::fs::write(&file, "not a dir").unwrap();

        let err = ensure_dir(&file).unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
        assert_eq!(err.path(), file.as_path());
    }
}
