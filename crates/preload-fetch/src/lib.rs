//! Streaming HTTP downloads that never leave a partial file behind.
//!
//! A [`Fetcher`] streams a response body into a staging directory next to the
//! destination, optionally verifies its SHA-256, and renames it into place.
//! Transport failures can be retried with exponential backoff.
//!
//! - `core` - pure helpers (backoff, digest parsing)
//! - `data` - options and progress snapshots
//! - `effects` - the [`HttpClient`] seam and the [`Fetcher`]

mod core;
mod data;
mod effects;
mod error;

pub use self::core::{parse_sha256, retry_delay};
pub use data::{FetchOptions, FetchPhase, Progress, Timeouts};
pub use effects::{BoxStream, Fetcher, HttpClient};
pub use error::{BoxError, FetchError, Result};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;
