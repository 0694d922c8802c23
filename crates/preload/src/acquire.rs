//! Idempotent fetch-and-extract of [`AcquisitionTarget`]s.
//!
//! Every step checks the filesystem right before acting and does nothing if
//! its artifact is already there. Downloads and extractions are staged next
//! to their destination and only renamed into place once complete, so an
//! interrupted run never leaves something that a later run would take for a
//! finished artifact.

use std::io;
use std::path::Path;
use std::sync::Arc;

use preload_archive::ExtractOptions;
use preload_fetch::{FetchError, FetchOptions, Fetcher, HttpClient, Progress};

use crate::error::{Error, Result};
use crate::target::AcquisitionTarget;
use crate::ui::{ProgressTracker, ProgressTrackerBuilder, Tracker, TrackerBuilder};

/// What [`Acquirer::acquire`] had to do for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub downloaded: bool,
    pub extracted: bool,
}

impl Outcome {
    pub fn is_noop(&self) -> bool {
        !self.downloaded && !self.extracted
    }
}

/// Creates `path` and any missing parents. A no-op if it is already a
/// directory; an [`Error::IoFailure`] if it exists as anything else.
pub fn ensure_directory(path: &Path) -> Result<()> {
    preload_fs::ensure_dir(path)?;
    Ok(())
}

pub struct Acquirer<C: HttpClient> {
    fetcher: Fetcher<C>,
    options: FetchOptions,
    progress: bool,
}

impl<C: HttpClient> Acquirer<C> {
    pub fn new(client: C) -> Self {
        Self {
            fetcher: Fetcher::new(client),
            options: FetchOptions::default(),
            progress: false,
        }
    }

    /// Retry transport failures up to `retries` times.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.options = self.options.max_retries(retries);
        self
    }

    #[must_use]
    pub fn with_fetch_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Render progress bars on stderr.
    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn client(&self) -> &C {
        self.fetcher.client()
    }

    /// Download the target's archive unless a file is already at
    /// `local_archive_path`. Returns whether a download happened.
    ///
    /// Presence is all that is checked: an existing file, even an empty one,
    /// is never replaced.
    pub async fn ensure_downloaded(&self, target: &AcquisitionTarget) -> Result<bool> {
        let archive = &target.local_archive_path;
        if archive.exists() {
            if archive.metadata().is_ok_and(|m| m.len() == 0) {
                tracing::warn!(
                    target_name = %target.name,
                    path = %archive.display(),
                    "archive exists but is empty; keeping it (presence is not verified)"
                );
            } else {
                tracing::info!(target_name = %target.name, path = %archive.display(), "archive already present");
            }
            return Ok(false);
        }

        tracing::info!(target_name = %target.name, url = %target.remote_url, "downloading");
        let tracker = self.tracker("Downloading", &target.name);
        let sink = tracker.clone();
        let options = self
            .options
            .clone()
            .checksum(target.sha256)
            .on_progress(Arc::new(move |p: &Progress| {
                if let Some(total) = p.total_bytes {
                    sink.set_total(total);
                }
                sink.advance_to(p.bytes_downloaded);
            }));

        match self.fetcher.fetch(&target.remote_url, archive, &options).await {
            Ok(bytes) => {
                tracker.finish();
                tracing::info!(target_name = %target.name, bytes, path = %archive.display(), "downloaded");
                Ok(true)
            }
            Err(err) => {
                tracker.abandon();
                Err(fetch_failure(target, err))
            }
        }
    }

    /// Unpack the archive into the target's base directory unless the
    /// extracted path already exists. Returns whether an extraction happened.
    pub async fn ensure_extracted(&self, target: &AcquisitionTarget) -> Result<bool> {
        let Some(extracted) = target.local_extracted_path.clone() else {
            return Ok(false);
        };
        if extracted.exists() {
            tracing::info!(target_name = %target.name, path = %extracted.display(), "already extracted");
            return Ok(false);
        }

        let archive = target.local_archive_path.clone();
        let base = target.base_dir().to_path_buf();
        tracing::info!(
            target_name = %target.name,
            archive = %archive.display(),
            destination = %base.display(),
            "extracting"
        );

        let tracker = self.tracker("Extracting", &target.name);
        let sink = tracker.clone();
        let options = ExtractOptions::default().on_progress(Arc::new(
            move |p: &preload_archive::Progress| {
                sink.advance_to(p.bytes_processed);
            },
        ));

        let task_archive = archive.clone();
        let result = tokio::task::spawn_blocking(move || {
            preload_archive::extract_file(&task_archive, &base, &options)
        })
        .await
        .unwrap_or_else(|join| Err(preload_archive::Error::Io(io::Error::other(join))));

        let report = match result {
            Ok(report) => {
                tracker.finish();
                report
            }
            Err(source) => {
                tracker.abandon();
                return Err(Error::ExtractionFailure { archive, source });
            }
        };

        if !extracted.exists() {
            return Err(Error::ExtractionFailure {
                archive,
                source: preload_archive::Error::Corrupted {
                    reason: format!(
                        "archive did not produce {}",
                        extracted.file_name().unwrap_or_default().to_string_lossy()
                    ),
                },
            });
        }

        tracing::info!(
            target_name = %target.name,
            entries = report.entry_count,
            bytes = report.total_bytes,
            "extracted"
        );
        Ok(true)
    }

    /// Bring one target to its satisfied state: directory, then archive,
    /// then extraction. Extraction is never attempted without an archive
    /// unless the extracted form is already present.
    pub async fn acquire(&self, target: &AcquisitionTarget) -> Result<Outcome> {
        let base = target.base_dir();
        ensure_directory(base)?;
        let stale = preload_fs::sweep_stale(base)?;
        if stale > 0 {
            tracing::debug!(count = stale, dir = %base.display(), "removed interrupted staging directories");
        }

        if target.extracted_present() {
            tracing::info!(target_name = %target.name, "already satisfied");
            return Ok(Outcome::default());
        }

        let downloaded = self.ensure_downloaded(target).await?;
        let extracted = self.ensure_extracted(target).await?;
        Ok(Outcome {
            downloaded,
            extracted,
        })
    }

    /// Acquire every target in order, stopping at the first failure.
    pub async fn acquire_all(&self, targets: &[AcquisitionTarget]) -> Result<Vec<Outcome>> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            outcomes.push(self.acquire(target).await?);
        }
        Ok(outcomes)
    }

    fn tracker(&self, prefix: &str, name: &str) -> ProgressTracker {
        let tracker = ProgressTrackerBuilder::default()
            .with_prefix(prefix)
            .with_finish(name)
            .hidden(!self.progress)
            .build();
        tracker.set_message(name.to_string());
        tracker
    }
}

fn fetch_failure(target: &AcquisitionTarget, err: FetchError) -> Error {
    if err.is_local() {
        Error::io(target.local_archive_path.clone(), err)
    } else {
        Error::NetworkFailure {
            url: target.remote_url.clone(),
            source: err,
        }
    }
}
