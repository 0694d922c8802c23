use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::progress::Progress;

/// Phases of a download operation.
///
/// Downloads progress through these phases in order:
/// Connecting → Downloading → Verifying → Committing → Completed
///
/// Retries return to the Connecting phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Request sent, waiting for the response body.
    #[default]
    Connecting,

    /// Streaming the body into the staging file.
    Downloading,

    /// Finalizing and comparing the checksum, if one was configured.
    Verifying,

    /// Moving the staged file to its destination.
    Committing,

    /// Terminal state for successful downloads.
    Completed,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPhase::Connecting => write!(f, "Connecting"),
            FetchPhase::Downloading => write!(f, "Downloading"),
            FetchPhase::Verifying => write!(f, "Verifying"),
            FetchPhase::Committing => write!(f, "Committing"),
            FetchPhase::Completed => write!(f, "Completed"),
        }
    }
}

/// Client-level timeouts. `None` means wait indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeouts {
    /// Limit for establishing the TCP/TLS connection.
    pub connect: Option<Duration>,
    /// Limit for a whole request, body included.
    pub total: Option<Duration>,
}

/// Configuration for a single fetch.
///
/// # Examples
///
/// ```
/// use preload_fetch::FetchOptions;
/// use std::time::Duration;
///
/// let options = FetchOptions::default()
///     .max_retries(2)
///     .retry_backoff(Duration::from_millis(200))
///     .header("Accept", "application/octet-stream");
/// ```
#[derive(Clone)]
pub struct FetchOptions {
    /// Expected SHA-256 of the body. A mismatch fails the fetch before the
    /// file is committed.
    pub checksum: Option<[u8; 32]>,

    /// Retries after the initial attempt, for transport failures only.
    ///
    /// Default: 0
    pub max_retries: u32,

    /// Base delay for exponential backoff; retry N waits `retry_backoff * 2^N`.
    ///
    /// Default: 500ms
    pub retry_backoff: Duration,

    /// Extra request headers, sent with every attempt.
    pub headers: Arc<[(String, String)]>,

    /// Invoked on phase transitions and after every chunk written.
    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("checksum", &self.checksum.map(hex::encode))
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("headers", &self.headers)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "{ ... }"))
            .finish()
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            checksum: None,
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
            headers: Arc::new([]),
            on_progress: None,
        }
    }
}

impl FetchOptions {
    #[must_use]
    pub fn checksum(mut self, checksum: Option<[u8; 32]>) -> Self {
        self.checksum = checksum;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    /// Add a single request header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers: Vec<_> = self.headers.iter().cloned().collect();
        headers.push((key.into(), value.into()));
        self.headers = Arc::from(headers);
        self
    }

    #[must_use]
    pub fn on_progress(mut self, on_progress: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }
}
