//! Directory and staging-workspace primitives.
//!
//! - [`ensure_dir`] - idempotent directory creation
//! - [`Workspace`] - staging directory with all-or-nothing commit

mod dir;
mod error;
mod workspace;

pub use dir::ensure_dir;
pub use error::{Error, Result};
pub use workspace::{STAGING_PREFIX, Workspace, sweep_stale};
