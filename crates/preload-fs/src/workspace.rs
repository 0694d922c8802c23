use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::dir::ensure_dir;
use crate::{Error, Result};

/// Name prefix of staging directories. Anything starting with it inside a
/// destination directory is scratch space and never a finished artifact.
pub const STAGING_PREFIX: &str = ".preload-staging-";

/// A staging directory living inside its destination directory.
///
/// Content is written into [`Workspace::path`] and only becomes visible in the
/// destination on [`Workspace::commit`], which renames every top-level entry
/// into place. Staging and destination share a filesystem, so each move is a
/// single rename. Dropping an uncommitted workspace removes the staging
/// directory and everything in it.
pub struct Workspace {
    staging: TempDir,
    destination: PathBuf,
}

impl Workspace {
    pub fn new(destination: impl AsRef<Path>) -> Result<Self> {
        let destination = destination.as_ref().to_path_buf();
        ensure_dir(&destination)?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&destination)
            .map_err(|source| Error::CreateDir {
                path: destination.clone(),
                source,
            })?;
        tracing::debug!(staging = %staging.path().display(), "opened staging workspace");

        Ok(Self {
            staging,
            destination,
        })
    }

    pub fn path(&self) -> &Path {
        self.staging.path()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Move every top-level staged entry into the destination, replacing
    /// entries of the same name. Returns the committed destination paths.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let staging = self.staging.path();
        let entries = fs::read_dir(staging).map_err(|source| Error::Read {
            path: staging.to_path_buf(),
            source,
        })?;

        let mut committed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::Read {
                path: staging.to_path_buf(),
                source,
            })?;
            let target = self.destination.join(entry.file_name());
            replace(&entry.path(), &target)?;
            committed.push(target);
        }

        tracing::debug!(
            destination = %self.destination.display(),
            entries = committed.len(),
            "committed staging workspace"
        );
        Ok(committed)
    }
}

fn replace(from: &Path, to: &Path) -> Result<()> {
    match fs::symlink_metadata(to) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(to),
        Ok(_) => fs::remove_file(to),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
    .map_err(|source| Error::Remove {
        path: to.to_path_buf(),
        source,
    })?;

    fs::rename(from, to).map_err(|source| Error::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

/// Remove staging directories left behind by a killed process.
///
/// Returns how many were removed. A missing `dir` is not an error.
pub fn sweep_stale(dir: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(source) => {
            return Err(Error::Read {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let is_staging = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(STAGING_PREFIX));
        if !is_staging || !entry.path().is_dir() {
            continue;
        }
        let path = entry.path();
        fs::remove_dir_all(&path).map_err(|source| Error::Remove {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "removed stale staging directory");
        removed += 1;
    }
    Ok(removed)
}
