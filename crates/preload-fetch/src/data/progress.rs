use crate::data::options::FetchPhase;

/// Snapshot of a download passed to progress callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub phase: FetchPhase,

    /// Bytes written to the staging file so far.
    pub bytes_downloaded: u64,

    /// Expected size from Content-Length, when the server sent one.
    pub total_bytes: Option<u64>,

    /// Current retry attempt (0 = first attempt).
    pub retry_count: u32,
}

impl Progress {
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.bytes_downloaded as f64 / total as f64) * 100.0
            }
        })
    }

    pub fn is_completed(&self) -> bool {
        self.phase == FetchPhase::Completed
    }
}
