use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by discovery. Parse failures are deliberately absent:
/// a batch that fails to parse degrades to zero observations and the scan
/// keeps going, while an unreadable file aborts the whole discovery call.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to stat file '{path}': {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid include pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

impl Error {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn stat(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Stat {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
