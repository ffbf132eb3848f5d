//! Error types shared by the table, the workers and the coordinator.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad command-line arguments
    #[error("usage: {0}")]
    Usage(String),

    /// Open/read/write failure on a real file
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact record stream is malformed
    #[error("{}: bad record at byte {offset}: {reason}", path.display())]
    Format {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("out of memory allocating table")]
    ResourceExhausted,

    /// Merged count no longer fits in a u64
    #[error("count for {key} overflows")]
    CountOverflow { key: String },

    /// One or more workers of a phase did not exit cleanly
    #[error("{phase} process failed ({failed} of {total} workers)")]
    ProcessFailure {
        phase: &'static str,
        failed: usize,
        total: usize,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(path: impl Into<PathBuf>, offset: u64, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            offset,
            reason: reason.into(),
        }
    }
}
