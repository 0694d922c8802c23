use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Progress snapshot passed to [`ExtractOptions::on_progress`] after each entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub entries_processed: usize,
    pub bytes_processed: u64,
    pub current_file: PathBuf,
}

#[derive(Clone, Default)]
pub struct ExtractOptions {
    /// Leading path components dropped from every entry, like
    /// `tar --strip-components`. Directory entries left with nothing are skipped.
    pub strip_components: usize,
    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,
}

impl fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("strip_components", &self.strip_components)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "{ ... }"))
            .finish()
    }
}

impl ExtractOptions {
    #[must_use]
    pub fn strip_components(mut self, count: usize) -> Self {
        self.strip_components = count;
        self
    }

    #[must_use]
    pub fn on_progress(mut self, callback: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub(crate) fn report(&self, progress: Progress) {
        if let Some(ref callback) = self.on_progress {
            callback(&progress);
        }
    }
}
