//! Atomic publish of a staging file onto the destination.
//!
//! On POSIX the publish is `rename(2)`: atomic within one filesystem, which
//! is why the staging file lives in the destination's directory. On Windows
//! the same [`NamedTempFile::persist`] call goes through `MoveFileExW`
//! replace semantics. The no-clobber variant uses the platform's
//! fail-if-exists primitive rather than an exists-check followed by a
//! rename, so two racing writers cannot both slip past the overwrite
//! policy. Error classification is the only logic that differs per
//! platform.

use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{WriteError, WriteResult};
use crate::path::ResolvedDest;

/// Flush `staging` to stable storage, then atomically publish it at the
/// destination, honoring the overwrite policy.
///
/// On any failure the staging file is removed and the destination is left
/// exactly as it was.
pub(crate) fn publish(
    staging: NamedTempFile,
    dest: &ResolvedDest,
    overwrite: bool,
) -> WriteResult<()> {
    // Data and metadata must hit stable storage before the new name does,
    // or a crash right after the rename could expose truncated content.
    if let Err(source) = staging.as_file().sync_all() {
        let path = staging.path().to_path_buf();
        // Dropping `staging` removes the file.
        return Err(WriteError::Resource { path, source });
    }

    let result = if overwrite {
        staging.persist(&dest.path)
    } else {
        staging.persist_noclobber(&dest.path)
    };

    match result {
        Ok(file) => {
            drop(file);
            sync_dir(&dest.dir);
            debug!(dest = %dest.path.display(), "published staging file");
            Ok(())
        }
        Err(err) => {
            // The handle comes back on failure; dropping it removes the
            // staging file.
            drop(err.file);
            Err(classify(err.error, &dest.path))
        }
    }
}

/// Map a failed rename onto the caller-facing taxonomy.
fn classify(error: io::Error, dest: &Path) -> WriteError {
    if error.kind() == io::ErrorKind::AlreadyExists {
        return WriteError::DestinationExists {
            path: dest.to_path_buf(),
        };
    }
    if is_busy(&error) {
        return WriteError::ResourceBusy {
            path: dest.to_path_buf(),
            source: error,
        };
    }
    // Everything else, including a cross-device rename when the staging
    // directory and destination ended up on different filesystems.
    WriteError::Resource {
        path: dest.to_path_buf(),
        source: error,
    }
}

#[cfg(windows)]
fn is_busy(error: &io::Error) -> bool {
    // ERROR_SHARING_VIOLATION (32) / ERROR_LOCK_VIOLATION (33): another
    // process holds the destination open without FILE_SHARE_DELETE.
    matches!(error.raw_os_error(), Some(32 | 33))
}

#[cfg(not(windows))]
const fn is_busy(_error: &io::Error) -> bool {
    // rename(2) replaces a destination other processes hold open; there is
    // no sharing-violation case to map.
    false
}

/// Make the rename itself durable. The destination already carries the new
/// content either way, so a failure here is logged, not surfaced.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(err) = std::fs::File::open(dir).and_then(|d| d.sync_all()) {
        tracing::warn!(dir = %dir.display(), error = %err, "failed to sync directory after publish");
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {
    // Directories cannot be opened for fsync without backup semantics on
    // Windows; MoveFileExW already writes through.
}
