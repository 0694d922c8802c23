use std::io::{Read, Seek};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::extract::{EntrySource, PendingEntry, PendingKind};
use crate::format::ArchiveFormat;

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader).map_err(Error::corrupted)?;
        Ok(Self { archive })
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(PendingEntry<'_>) -> Result<()>,
    ) -> Result<()> {
        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index).map_err(Error::corrupted)?;

            // Raw name; traversal is rejected by the sanitizer with a proper error.
            let original_path = PathBuf::from(file.name());
            let size = file.size();
            let mode = file.unix_mode();

            let kind = if file.is_dir() {
                PendingKind::Directory
            } else if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
                let mut target = String::new();
                file.read_to_string(&mut target)
                    .map_err(|_| Error::InvalidPath)?;
                PendingKind::Symlink {
                    target: PathBuf::from(target),
                }
            } else {
                PendingKind::File(Box::new(&mut file))
            };

            visit(PendingEntry {
                original_path,
                size,
                mode,
                kind,
            })?;
        }

        Ok(())
    }
}
