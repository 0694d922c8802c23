//! What gets fetched, and where it lands.

use std::fmt;
use std::path::{Path, PathBuf};

pub const EMBEDDINGS_URL: &str =
    "https://s3.amazonaws.com/dl4j-distribution/GoogleNews-vectors-negative300.bin.gz";
pub const EMBEDDINGS_ARCHIVE: &str = "GoogleNews-vectors-negative300.bin.gz";

pub const REVIEWS_URL: &str = "http://ai.stanford.edu/~amaas/data/sentiment/aclImdb_v1.tar.gz";
pub const REVIEWS_DIR: &str = "dl4j_w2vSentiment";
pub const REVIEWS_ARCHIVE: &str = "aclImdb_v1.tar.gz";
pub const REVIEWS_EXTRACTED: &str = "aclImdb";

pub const CIFAR_URL: &str = "https://www.cs.toronto.edu/~kriz/cifar-10-binary.tar.gz";
pub const CIFAR_DIR: &str = "cifar";
pub const CIFAR_ARCHIVE: &str = "cifar-10-binary.tar.gz";
pub const CIFAR_EXTRACTED: &str = "cifar-10-batches-bin";

/// One remote artifact and its local representation.
///
/// A target with an extracted path is satisfied once that path exists,
/// whether or not the archive is still around. Otherwise the archive itself
/// must exist. Both checks are presence-only.
#[derive(Clone, PartialEq, Eq)]
pub struct AcquisitionTarget {
    pub name: String,
    pub remote_url: String,
    pub local_archive_path: PathBuf,
    pub local_extracted_path: Option<PathBuf>,
    /// Expected digest of a fresh download.
    pub sha256: Option<[u8; 32]>,
}

impl AcquisitionTarget {
    pub fn new(
        name: impl Into<String>,
        remote_url: impl Into<String>,
        local_archive_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            remote_url: remote_url.into(),
            local_archive_path: local_archive_path.into(),
            local_extracted_path: None,
            sha256: None,
        }
    }

    #[must_use]
    pub fn with_extracted(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_extracted_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_sha256(mut self, digest: [u8; 32]) -> Self {
        self.sha256 = Some(digest);
        self
    }

    /// Directory holding the archive; extraction happens here.
    pub fn base_dir(&self) -> &Path {
        self.local_archive_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    pub fn archive_present(&self) -> bool {
        self.local_archive_path.is_file()
    }

    pub fn extracted_present(&self) -> bool {
        self.local_extracted_path.as_deref().is_some_and(Path::exists)
    }

    pub fn is_satisfied(&self) -> bool {
        match self.local_extracted_path {
            Some(_) => self.extracted_present(),
            None => self.archive_present(),
        }
    }

    /// The path whose presence decides [`is_satisfied`](Self::is_satisfied).
    pub fn marker_path(&self) -> &Path {
        self.local_extracted_path
            .as_deref()
            .unwrap_or(&self.local_archive_path)
    }
}

impl fmt::Debug for AcquisitionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquisitionTarget")
            .field("name", &self.name)
            .field("remote_url", &self.remote_url)
            .field("local_archive_path", &self.local_archive_path)
            .field("local_extracted_path", &self.local_extracted_path)
            .field("sha256", &self.sha256.map(hex::encode))
            .finish()
    }
}

/// The built-in targets, in acquisition order.
pub fn builtin_targets(data_dir: &Path) -> Vec<AcquisitionTarget> {
    let reviews = data_dir.join(REVIEWS_DIR);
    let cifar = data_dir.join(CIFAR_DIR);

    vec![
        AcquisitionTarget::new("embeddings", EMBEDDINGS_URL, data_dir.join(EMBEDDINGS_ARCHIVE)),
        AcquisitionTarget::new("reviews", REVIEWS_URL, reviews.join(REVIEWS_ARCHIVE))
            .with_extracted(reviews.join(REVIEWS_EXTRACTED)),
        AcquisitionTarget::new("cifar", CIFAR_URL, cifar.join(CIFAR_ARCHIVE))
            .with_extracted(cifar.join(CIFAR_EXTRACTED)),
    ]
}
