#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use preload_fetch::{BoxStream, HttpClient};

#[derive(Debug, thiserror::Error)]
#[error("mock: {0}")]
pub struct MockError(pub String);

/// Serves fixed bodies by URL and records every GET.
#[derive(Default)]
pub struct MockClient {
    bodies: HashMap<String, Vec<u8>>,
    gets: Mutex<Vec<String>>,
    /// Directory whose existence is recorded at the time of each GET.
    probe: Option<PathBuf>,
    probed: Mutex<Vec<bool>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn probe_dir(mut self, dir: PathBuf) -> Self {
        self.probe = Some(dir);
        self
    }

    pub fn gets(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    pub fn probed(&self) -> Vec<bool> {
        self.probed.lock().unwrap().clone()
    }
}

impl HttpClient for MockClient {
    type Error = MockError;

    async fn stream(
        &self,
        url: &str,
        _headers: &[(String, String)],
    ) -> Result<BoxStream<'static, Result<Bytes, MockError>>, MockError> {
        self.gets.lock().unwrap().push(url.to_string());
        if let Some(dir) = &self.probe {
            self.probed.lock().unwrap().push(dir.is_dir());
        }

        let body = self
            .bodies
            .get(url)
            .cloned()
            .ok_or_else(|| MockError(format!("404 for {url}")))?;
        let chunks: Vec<Result<Bytes, MockError>> = body
            .chunks(4096)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(futures_util::stream::iter(chunks)))
    }

    async fn head(&self, url: &str) -> Result<Option<u64>, MockError> {
        Ok(self.bodies.get(url).map(|b| b.len() as u64))
    }
}

/// A gzip-compressed tar containing `files` (path, contents).
pub fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, body) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, body.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Stand-in for the gzip-compressed embeddings binary.
pub fn gz(contents: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(contents).unwrap();
    encoder.finish().unwrap()
}
