//! Error types for preload-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("invalid SHA-256 digest '{0}'")]
    InvalidChecksum(String),

    #[error("gave up after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    #[error("destination path is a directory: {}", .0.display())]
    DestinationIsDirectory(PathBuf),

    #[error("destination path has no file name: {}", .0.display())]
    InvalidDestination(PathBuf),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Fs(#[from] preload_fs::Error),
}

impl FetchError {
    pub(crate) fn network<E>(url: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            url: url.to_string(),
            source: Box::new(source),
        }
    }

    /// Whether another attempt could succeed. Only transport failures qualify;
    /// local I/O and verification failures are deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Whether the failure happened on the local side (disk, paths) rather
    /// than on the network or during verification.
    pub fn is_local(&self) -> bool {
        match self {
            Self::Io { .. }
            | Self::Fs(_)
            | Self::DestinationIsDirectory(_)
            | Self::InvalidDestination(_) => true,
            Self::RetriesExhausted { last, .. } => last.is_local(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
