//! Format-independent extraction pipeline.
//!
//! Each archive format implements [`EntrySource`], handing entries one at a
//! time to a visitor. [`extract`] sanitizes every entry path against the
//! destination before anything is written.

use std::fs;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use crate::entry::{ArchiveReport, Entry, EntryKind};
use crate::error::{Error, Result};
use crate::format::{self, ArchiveFormat};
use crate::options::{ExtractOptions, Progress};
use crate::sanitize::{sanitize_path, sanitize_symlink_target};

#[cfg(feature = "tar")]
mod tar;
#[cfg(feature = "zip")]
mod zip;

#[cfg(feature = "tar")]
pub use self::tar::TarSource;
#[cfg(feature = "zip")]
pub use self::zip::ZipSource;

/// An entry read from an archive but not yet written.
pub struct PendingEntry<'a> {
    pub original_path: PathBuf,
    pub size: u64,
    pub mode: Option<u32>,
    pub kind: PendingKind<'a>,
}

pub enum PendingKind<'a> {
    /// Regular file; the reader yields its contents.
    File(Box<dyn Read + 'a>),
    Directory,
    Symlink { target: PathBuf },
}

/// Archive-specific entry source.
pub trait EntrySource {
    fn format(&self) -> ArchiveFormat;

    /// Call `visit` for each entry in archive order, stopping at the first error.
    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(PendingEntry<'_>) -> Result<()>,
    ) -> Result<()>;
}

/// Write every entry of `source` under `destination`.
pub fn extract<S: EntrySource + ?Sized>(
    source: &mut S,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let format = source.format();
    let mut entries = Vec::new();
    let mut total_bytes = 0u64;

    ensure_directory(destination)?;
    let root = fs::canonicalize(destination)?;

    source.for_each_entry(&mut |pending| {
        let PendingEntry {
            original_path,
            size,
            mode,
            kind,
        } = pending;

        let sanitized = match sanitize_path(&original_path, destination, options) {
            Ok(sanitized) => sanitized,
            Err(Error::NoComponentsRemaining { .. }) if matches!(kind, PendingKind::Directory) => {
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let target_path = sanitized.resolved;

        let kind = match kind {
            PendingKind::File(mut reader) => {
                ensure_parent_within(&target_path, &root)?;
                remove_symlink(&target_path)?;
                total_bytes += write_file(&mut *reader, &target_path)?;
                apply_mode(&target_path, mode)?;
                EntryKind::File
            }
            PendingKind::Directory => {
                ensure_within(&target_path, &root)?;
                ensure_directory(&target_path)?;
                EntryKind::Directory
            }
            PendingKind::Symlink { target } => {
                sanitize_symlink_target(&target, &target_path, destination)?;
                ensure_parent_within(&target_path, &root)?;
                remove_symlink(&target_path)?;
                write_symlink(&target, &target_path)?;
                check_link_within(&target, &target_path, &root)?;
                EntryKind::Symlink { target }
            }
        };

        options.report(Progress {
            entries_processed: entries.len() + 1,
            bytes_processed: total_bytes,
            current_file: original_path.clone(),
        });
        entries.push(Entry::new(original_path, size, mode, kind).with_target_path(target_path));
        Ok(())
    })?;

    tracing::debug!(
        ?format,
        entries = entries.len(),
        bytes = total_bytes,
        destination = %destination.display(),
        "extracted archive"
    );

    Ok(ArchiveReport {
        format,
        entry_count: entries.len(),
        total_bytes,
        entries,
        committed: Vec::new(),
    })
}

/// Extract with automatic format detection.
pub fn extract_from_reader<R: Read + Seek>(
    mut reader: R,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let format = format::detect_from_reader(&mut reader)?;

    match format {
        #[cfg(feature = "zip")]
        ArchiveFormat::Zip => extract(&mut ZipSource::new(reader)?, destination, options),
        #[cfg(feature = "tar")]
        ArchiveFormat::Tar(codec) => extract(&mut TarSource::new(reader, codec), destination, options),
        #[allow(unreachable_patterns)]
        _ => Err(Error::UnsupportedFormat),
    }
}

/// Fail if the deepest existing ancestor of `path` (or `path` itself)
/// resolves outside `root` once symlinks already on disk are followed.
fn ensure_within(path: &Path, root: &Path) -> Result<()> {
    let mut current = Some(path);
    while let Some(candidate) = current {
        match fs::canonicalize(candidate) {
            Ok(real) if real.starts_with(root) => return Ok(()),
            Ok(real) => {
                return Err(Error::SymlinkEscape {
                    target: path.to_path_buf(),
                    resolved: real,
                });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => current = candidate.parent(),
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(())
}

fn ensure_parent_within(path: &Path, root: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => ensure_within(parent, root),
        None => Ok(()),
    }
}

/// A later entry replaces an earlier link instead of writing through it.
fn remove_symlink(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::remove_file(path).map_err(|source| Error::ExtractionFailed {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// A link whose target text stays inside can still escape by passing through
/// earlier links. Resolve it for real and undo it if it does.
fn check_link_within(target: &Path, link: &Path, root: &Path) -> Result<()> {
    let Ok(real) = fs::canonicalize(link) else {
        return Ok(());
    };
    if real.starts_with(root) {
        return Ok(());
    }
    let _ = fs::remove_file(link);
    Err(Error::SymlinkEscape {
        target: target.to_path_buf(),
        resolved: real,
    })
}

fn write_file(reader: &mut dyn Read, target_path: &Path) -> Result<u64> {
    if let Some(parent) = target_path.parent() {
        ensure_directory(parent)?;
    }

    let extraction_failed = |source| Error::ExtractionFailed {
        path: target_path.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(target_path).map_err(extraction_failed)?;
    io::copy(reader, &mut file).map_err(extraction_failed)
}

fn ensure_directory(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|source| Error::DirectoryCreationFailed {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    // Only executables need anything beyond the default file mode.
    let Some(mode) = mode.filter(|m| m & 0o111 != 0) else {
        return Ok(());
    };
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777)).map_err(|source| {
        Error::ExtractionFailed {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn write_symlink(target: &Path, link: &Path) -> Result<()> {
    if let Some(parent) = link.parent() {
        ensure_directory(parent)?;
    }
    std::os::unix::fs::symlink(target, link).map_err(|source| Error::SymlinkCreationFailed {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source,
    })
}

#[cfg(windows)]
fn write_symlink(target: &Path, link: &Path) -> Result<()> {
    use std::os::windows::fs;

    if let Some(parent) = link.parent() {
        ensure_directory(parent)?;
    }
    let is_dir_target = link.parent().is_some_and(|p| p.join(target).is_dir());
    let result = if is_dir_target {
        fs::symlink_dir(target, link)
    } else {
        fs::symlink_file(target, link)
    };
    result.map_err(|source| Error::SymlinkCreationFailed {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source,
    })
}
