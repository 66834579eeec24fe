//! Error types shared by the buffer, overlay and persistence layers.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout `kaser-editor`.
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors produced by the line editing engine.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Reading or writing a file failed.
    #[error("{op} {}: {source}", path.display())]
    Io {
        /// Short description of the failed operation (`"read"`, `"write"`, ...).
        op: &'static str,
        /// File the operation targeted.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// The backup copy could not be created, so the save was aborted.
    #[error("backup of {} to {} failed: {source}", path.display(), backup.display())]
    BackupFailed {
        /// File being saved.
        path: PathBuf,
        /// Backup destination.
        backup: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// A line index was outside the buffer (and overlay) bounds.
    #[error("line index {index} out of range (line count {len})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Line count at the time of the request.
        len: usize,
    },
    /// The buffer must keep at least one line.
    #[error("cannot remove the only remaining line")]
    LastLine,
    /// The file is not valid UTF-8 text.
    #[error("{} is not valid UTF-8 text", path.display())]
    Encoding {
        /// Offending file.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl EditorError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for failures caused by the filesystem (as opposed to index bugs).
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::BackupFailed { .. })
    }
}
