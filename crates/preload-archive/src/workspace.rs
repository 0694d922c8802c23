use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use preload_fs::Workspace;

use crate::entry::ArchiveReport;
use crate::error::{Error, Result};
use crate::extract::extract_from_reader;
use crate::options::ExtractOptions;

/// An extraction sitting in a staging directory, not yet visible in its
/// destination.
pub struct WorkspaceExtraction {
    workspace: Workspace,
    report: ArchiveReport,
}

impl WorkspaceExtraction {
    /// Move the extracted top-level entries into the destination.
    pub fn commit(self) -> Result<ArchiveReport> {
        let committed = self.workspace.commit()?;
        let mut report = self.report;
        report.committed = committed;
        Ok(report)
    }

    pub fn abort(self) {
        drop(self.workspace);
    }

    pub fn report(&self) -> &ArchiveReport {
        &self.report
    }

    pub fn staging_path(&self) -> &Path {
        self.workspace.path()
    }
}

/// Extract into a staging directory inside `destination`.
///
/// Nothing appears in `destination` until [`WorkspaceExtraction::commit`];
/// on error, or if the extraction is dropped, the staging directory is removed.
pub fn extract_to_workspace<R: Read + Seek>(
    reader: R,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<WorkspaceExtraction> {
    let workspace = Workspace::new(destination)?;
    let report = extract_from_reader(reader, workspace.path(), options)?;
    Ok(WorkspaceExtraction { workspace, report })
}

/// Extract the archive at `archive` into `destination` and commit.
pub fn extract_file(
    archive: &Path,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let file = File::open(archive).map_err(|source| Error::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    extract_to_workspace(BufReader::new(file), destination, options)?.commit()
}
