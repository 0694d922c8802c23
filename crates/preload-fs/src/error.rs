use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path exists and is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to remove {}: {source}", path.display())]
    Remove { path: PathBuf, source: io::Error },

    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

impl Error {
    /// The path the failed operation was acting on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotADirectory { path }
            | Self::CreateDir { path, .. }
            | Self::Read { path, .. }
            | Self::Remove { path, .. } => path,
            Self::Rename { to, .. } => to,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
