//! Destination path resolution.
//!
//! Turns a caller-supplied path into an absolute, symlink-resolved
//! destination plus the directory the staging file must be created in.
//! Staging in the destination's own directory keeps the final publish a
//! same-filesystem rename, which is what makes it atomic.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{WriteError, WriteResult};

/// A resolved destination: the absolute path to publish to and the
/// directory that will hold the staging file.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedDest {
    pub(crate) path: PathBuf,
    pub(crate) dir: PathBuf,
}

/// Resolve `dest` into a [`ResolvedDest`].
///
/// An existing destination is canonicalized directly, which also resolves a
/// final symlink component. A destination that does not exist yet gets its
/// parent directory canonicalized and the file name re-attached; the parent
/// must already exist.
///
/// Relative inputs resolve against the current working directory at call
/// time. The returned path is what `commit()` hands back to the caller.
pub(crate) fn resolve_destination(dest: &Path) -> WriteResult<ResolvedDest> {
    if dest.as_os_str().is_empty() {
        return Err(invalid(dest, "empty path"));
    }

    match std::fs::canonicalize(dest) {
        Ok(path) => {
            if path.is_dir() {
                return Err(invalid(dest, "destination is a directory"));
            }
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| invalid(dest, "destination has no parent directory"))?;
            Ok(ResolvedDest { path, dir })
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => resolve_new(dest),
        Err(err) => Err(invalid(dest, &err.to_string())),
    }
}

/// Resolve a destination that is not on disk yet: canonicalize the parent,
/// keep the file name as given.
fn resolve_new(dest: &Path) -> WriteResult<ResolvedDest> {
    let file_name = dest
        .file_name()
        .ok_or_else(|| invalid(dest, "path has no file name"))?;

    // A bare file name has an empty parent; that means the current directory.
    let parent = match dest.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => Path::new("."),
    };

    let dir = std::fs::canonicalize(parent).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            invalid(dest, "parent directory does not exist")
        } else {
            invalid(dest, &err.to_string())
        }
    })?;

    if !dir.is_dir() {
        return Err(invalid(dest, "parent is not a directory"));
    }

    Ok(ResolvedDest {
        path: dir.join(file_name),
        dir,
    })
}

fn invalid(path: &Path, reason: &str) -> WriteError {
    WriteError::InvalidPath {
        path: path.to_path_buf(),
        reason: reason.to_owned(),
    }
}
