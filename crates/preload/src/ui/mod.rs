pub mod table;
pub mod tracker;

pub use table::{TargetRow, targets_table};
pub use tracker::{ProgressTracker, ProgressTrackerBuilder, Tracker, TrackerBuilder};
