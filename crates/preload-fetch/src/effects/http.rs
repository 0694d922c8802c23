use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Asynchronous HTTP client abstraction.
///
/// The minimal surface the [`Fetcher`](crate::Fetcher) needs. Implementations
/// own redirect handling and timeouts, and must report non-success status
/// codes from [`HttpClient::stream`] as errors.
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a GET request and return the response body as a stream.
    fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<
        Output = Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error>,
    > + Send;

    /// Query Content-Length without downloading the body.
    ///
    /// `Ok(None)` when the header is absent or the server refuses HEAD.
    fn head(&self, url: &str) -> impl Future<Output = Result<Option<u64>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::data::Timeouts;
    use futures_util::TryStreamExt;

    /// Production HTTP client backed by `reqwest`.
    #[derive(Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self, reqwest::Error> {
            Self::with_timeouts(Timeouts::default())
        }

        pub fn with_timeouts(timeouts: Timeouts) -> Result<Self, reqwest::Error> {
            let mut builder = reqwest::Client::builder()
                .user_agent(concat!("preload/", env!("CARGO_PKG_VERSION")));
            if let Some(connect) = timeouts.connect {
                builder = builder.connect_timeout(connect);
            }
            if let Some(total) = timeouts.total {
                builder = builder.timeout(total);
            }
            Ok(Self {
                client: builder.build()?,
            })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn stream(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error> {
            let mut request = self.client.get(url);
            for (key, value) in headers {
                request = request.header(key.as_str(), value.as_str());
            }

            let response = request.send().await?.error_for_status()?;
            let stream = response.bytes_stream().map_ok(Bytes::from);
            Ok(Box::pin(stream))
        }

        async fn head(&self, url: &str) -> Result<Option<u64>, Self::Error> {
            let response = self.client.head(url).send().await?;
            if !response.status().is_success() {
                return Ok(None);
            }
            let content_length = response
                .headers()
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            Ok(content_length)
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
