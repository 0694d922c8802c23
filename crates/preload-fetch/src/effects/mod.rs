//! I/O: the HTTP client seam and the fetcher built on it.

pub mod fetcher;
pub mod http;

pub use fetcher::Fetcher;
pub use http::{BoxStream, HttpClient};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
