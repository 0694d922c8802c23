//! Archive extraction with path sanitization and staged commit.
//!
//! - `format.rs` - magic-byte detection and tar decompression
//! - `sanitize.rs` - path sanitization (zip-slip prevention)
//! - `extract/` - per-format entry sources and the shared pipeline
//! - `workspace.rs` - extraction into a staging directory, then commit

pub mod entry;
pub mod extract;
mod error;
mod format;
pub mod options;
mod sanitize;
mod workspace;

pub use entry::{ArchiveReport, Entry, EntryKind};
pub use error::{Error, Result};
pub use extract::extract_from_reader;
pub use format::{ArchiveFormat, TarCompress, detect_format, detect_from_reader};
pub use options::{ExtractOptions, Progress};
pub use sanitize::{SanitizedPath, sanitize_path, sanitize_symlink_target};
pub use workspace::{WorkspaceExtraction, extract_file, extract_to_workspace};

#[cfg(feature = "tar")]
pub use format::Decoder;
