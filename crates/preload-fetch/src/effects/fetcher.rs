use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use preload_fs::Workspace;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::core::retry_delay;
use crate::data::{FetchOptions, FetchPhase, Progress};
use crate::effects::http::HttpClient;
use crate::error::{FetchError, Result};

/// Downloads a URL to a file, never leaving a partial file at the destination.
///
/// The body is streamed into a [`Workspace`] created in the destination's
/// parent directory and renamed into place once complete and verified. On any
/// failure the workspace is dropped together with the partial file.
pub struct Fetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch `url` into `destination`, retrying transport failures according
    /// to `options`. Returns the number of bytes written.
    pub async fn fetch(&self, url: &str, destination: &Path, options: &FetchOptions) -> Result<u64> {
        if destination.is_dir() {
            return Err(FetchError::DestinationIsDirectory(destination.to_path_buf()));
        }

        let mut attempt = 0u32;
        loop {
            let err = match self.fetch_once(url, destination, options, attempt).await {
                Ok(bytes) => return Ok(bytes),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }
            if attempt >= options.max_retries {
                return Err(if attempt == 0 {
                    err
                } else {
                    FetchError::RetriesExhausted {
                        attempts: attempt + 1,
                        last: Box::new(err),
                    }
                });
            }

            let delay = retry_delay(attempt, options.retry_backoff);
            tracing::warn!(
                url,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "download failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn fetch_once(
        &self,
        url: &str,
        destination: &Path,
        options: &FetchOptions,
        retry_count: u32,
    ) -> Result<u64> {
        let file_name = destination
            .file_name()
            .ok_or_else(|| FetchError::InvalidDestination(destination.to_path_buf()))?;
        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let report = |phase, bytes_downloaded, total_bytes| {
            if let Some(ref callback) = options.on_progress {
                callback(&Progress {
                    phase,
                    bytes_downloaded,
                    total_bytes,
                    retry_count,
                });
            }
        };

        report(FetchPhase::Connecting, 0, None);
        let total_bytes = match self.client.head(url).await {
            Ok(len) => len,
            Err(e) => {
                tracing::debug!(url, error = %e, "HEAD failed, size unknown");
                None
            }
        };

        let workspace = Workspace::new(parent)?;
        let staging_file = workspace.path().join(file_name);

        let mut stream = self
            .client
            .stream(url, &options.headers)
            .await
            .map_err(|e| FetchError::network(url, e))?;
        let mut file = tokio::fs::File::create(&staging_file)
            .await
            .map_err(|source| io_error(&staging_file, source))?;
        let mut hasher = options.checksum.map(|_| Sha256::new());

        report(FetchPhase::Downloading, 0, total_bytes);
        let mut bytes_downloaded = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::network(url, e))?;
            if let Some(ref mut h) = hasher {
                h.update(&chunk);
            }
            file.write_all(&chunk)
                .await
                .map_err(|source| io_error(&staging_file, source))?;
            bytes_downloaded += chunk.len() as u64;
            report(FetchPhase::Downloading, bytes_downloaded, total_bytes);
        }

        file.flush()
            .await
            .map_err(|source| io_error(&staging_file, source))?;
        file.sync_all()
            .await
            .map_err(|source| io_error(&staging_file, source))?;
        drop(file);

        report(FetchPhase::Verifying, bytes_downloaded, total_bytes);
        if let (Some(hasher), Some(expected)) = (hasher, options.checksum) {
            let actual: [u8; 32] = hasher.finalize().into();
            if actual != expected {
                return Err(FetchError::ChecksumMismatch {
                    expected: hex::encode(expected),
                    actual: hex::encode(actual),
                });
            }
        }

        report(FetchPhase::Committing, bytes_downloaded, total_bytes);
        workspace.commit()?;

        report(FetchPhase::Completed, bytes_downloaded, total_bytes);
        tracing::debug!(url, bytes = bytes_downloaded, path = %destination.display(), "download committed");
        Ok(bytes_downloaded)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> FetchError {
    FetchError::Io {
        path: PathBuf::from(path),
        source,
    }
}
