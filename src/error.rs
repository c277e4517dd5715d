//! Error types for the atomicwriter crate.

use std::path::PathBuf;

/// Errors surfaced by atomic write operations.
///
/// The destination is modified if and only if the operation returned `Ok`;
/// every variant below implies the destination was left untouched.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Destination could not be resolved to a writable location.
    #[error("invalid destination path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// Overwrite was not requested and the destination already exists.
    /// Carries the fully resolved destination path.
    #[error("destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// Staging, flushing, or publishing failed at the filesystem level
    /// (disk full, permission denied, cross-device rename).
    #[error("I/O error on {path}: {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The platform refused to replace a destination that another process
    /// holds open with exclusive access.
    #[error("destination busy: {path}: {source}")]
    ResourceBusy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation invoked on a writer that is no longer open
    /// (write or commit after a failed write discarded the staging file).
    #[error("writer is not open: {0}")]
    Usage(&'static str),
}

/// Convenience result type for atomic write operations.
pub type WriteResult<T> = Result<T, WriteError>;
