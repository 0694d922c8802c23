use std::path::PathBuf;

use preload_fetch::{BoxError, FetchError};
use thiserror::Error;

use crate::config::DATA_DIR_ENV;

#[derive(Debug, Error)]
pub enum Error {
    #[error("data directory is not configured: set {var} or pass --data-dir", var = DATA_DIR_ENV)]
    ConfigurationMissing,

    #[error("invalid manifest {}: {reason}", path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("failed to download {url}")]
    NetworkFailure {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("I/O failure at {}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("failed to extract {}", archive.display())]
    ExtractionFailure {
        archive: PathBuf,
        #[source]
        source: preload_archive::Error,
    },

    #[error("health check '{check}' failed")]
    HealthCheckFailed {
        check: String,
        #[source]
        reason: BoxError,
    },
}

impl Error {
    /// Process exit status for this error: 1 for configuration problems,
    /// 2 for everything that went wrong while acquiring.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigurationMissing | Self::InvalidManifest { .. } => 1,
            _ => 2,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::IoFailure {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn manifest(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::InvalidManifest {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<preload_fs::Error> for Error {
    fn from(e: preload_fs::Error) -> Self {
        Self::io(e.path().to_path_buf(), e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
