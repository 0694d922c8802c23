use std::io::Read;

use crate::error::{Error, Result};
use crate::extract::{EntrySource, PendingEntry, PendingKind};
use crate::format::{ArchiveFormat, Decoder, TarCompress};

/// Tar entries, optionally gzip-compressed.
pub struct TarSource<R: Read> {
    archive: tar::Archive<Decoder<R>>,
    codec: TarCompress,
}

impl<R: Read> TarSource<R> {
    pub fn new(reader: R, codec: TarCompress) -> Self {
        Self {
            archive: tar::Archive::new(codec.decoder(reader)),
            codec,
        }
    }
}

impl<R: Read> EntrySource for TarSource<R> {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Tar(self.codec)
    }

    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(PendingEntry<'_>) -> Result<()>,
    ) -> Result<()> {
        let entries = self.archive.entries().map_err(Error::corrupted)?;

        for entry in entries {
            let mut entry = entry.map_err(Error::corrupted)?;
            let original_path = entry.path().map_err(|_| Error::InvalidPath)?.into_owned();

            let header = entry.header();
            let size = header.size().unwrap_or(0);
            let mode = header.mode().ok();
            let entry_type = header.entry_type();

            let kind = if entry_type.is_dir() {
                PendingKind::Directory
            } else if entry_type.is_symlink() {
                let target = entry
                    .link_name()
                    .map_err(|_| Error::InvalidPath)?
                    .ok_or(Error::InvalidPath)?
                    .into_owned();
                PendingKind::Symlink { target }
            } else if entry_type.is_file() || entry_type.is_contiguous() {
                PendingKind::File(Box::new(&mut entry))
            } else {
                tracing::debug!(
                    path = %original_path.display(),
                    ?entry_type,
                    "skipping unsupported tar entry"
                );
                continue;
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
