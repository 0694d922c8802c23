use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::options::ExtractOptions;

/// Result of sanitizing an archive entry path.
#[derive(Clone, Debug)]
pub struct SanitizedPath {
    pub original: PathBuf,
    pub resolved: PathBuf,
}

/// Resolve an entry path under `base`, applying `strip_components`.
///
/// Absolute entries and entries whose `..` components climb out of `base`
/// are rejected with [`Error::ZipSlip`].
pub fn sanitize_path<P: AsRef<Path>, B: AsRef<Path>>(
    entry_path: P,
    base: B,
    options: &ExtractOptions,
) -> Result<SanitizedPath> {
    let entry_path = entry_path.as_ref();
    let base = normalize_path(base.as_ref());

    if entry_path.as_os_str().is_empty() || entry_path.to_string_lossy().contains('\0') {
        return Err(Error::InvalidPath);
    }

    let relative = match relative_components(entry_path) {
        Some(relative) => relative,
        None => {
            return Err(Error::ZipSlip {
                entry: entry_path.to_path_buf(),
                resolved: normalize_path(&base.join(entry_path)),
            });
        }
    };

    let processed = if options.strip_components > 0 {
        strip_components(&relative, options.strip_components)?
    } else {
        relative
    };

    let resolved = normalize_path(&base.join(processed));
    if !resolved.starts_with(&base) {
        return Err(Error::ZipSlip {
            entry: entry_path.to_path_buf(),
            resolved,
        });
    }

    Ok(SanitizedPath {
        original: entry_path.to_path_buf(),
        resolved,
    })
}

/// Check that a symlink at `symlink_location` pointing to `target` stays
/// inside `base`. Returns the resolved target.
///
/// `symlink_location` is the already-sanitized path of the link itself.
pub fn sanitize_symlink_target<P: AsRef<Path>, L: AsRef<Path>, B: AsRef<Path>>(
    target: P,
    symlink_location: L,
    base: B,
) -> Result<PathBuf> {
    let target = target.as_ref();
    let symlink_location = symlink_location.as_ref();
    let base = normalize_path(base.as_ref());

    if target.is_absolute() {
        return Err(Error::AbsoluteSymlinkTarget {
            target: target.to_path_buf(),
            symlink: symlink_location.to_path_buf(),
        });
    }

    let parent = symlink_location
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(base.as_path());
    let final_path = normalize_path(&parent.join(target));

    if !final_path.starts_with(&base) {
        return Err(Error::SymlinkEscape {
            target: target.to_path_buf(),
            resolved: final_path,
        });
    }

    Ok(final_path)
}

/// Strip leading path components.
fn strip_components(path: &Path, count: usize) -> Result<PathBuf> {
    let components: Vec<_> = path.components().collect();
    if components.len() <= count {
        return Err(Error::NoComponentsRemaining {
            original: path.to_path_buf(),
            count,
        });
    }
    Ok(components[count..].iter().collect())
}

/// Relative form of an entry path, or `None` if it is rooted or its `..`
/// components climb above its own top level.
fn relative_components(path: &Path) -> Option<PathBuf> {
    let mut result = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Normal(part) => {
                result.push(part);
                depth += 1;
            }
            Component::ParentDir => {
                depth = depth.checked_sub(1)?;
                result.pop();
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(result)
}

/// Lexically resolve `.` and `..` components.
fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            other => result.push(other.as_os_str()),
        }
    }
    result
}
