//! Staging file allocation.
//!
//! Each writer gets exactly one staging file, created next to the
//! destination under a hidden name: `.<dest-name>.<random>.tmp`. The random
//! infix and the retry-on-collision loop come from [`tempfile::Builder`],
//! so concurrent writers targeting the same destination never collide. The
//! file is created with owner-only permissions and is removed on drop until
//! it is persisted.

use std::ffi::{OsStr, OsString};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{WriteError, WriteResult};
use crate::path::ResolvedDest;

/// Create the staging file for `dest` in its publish directory.
pub(crate) fn allocate(dest: &ResolvedDest) -> WriteResult<NamedTempFile> {
    // `dest.path` always carries a file name by construction; the fallback
    // only guards the type-level `Option`.
    let mut prefix = OsString::from(".");
    prefix.push(dest.path.file_name().unwrap_or(OsStr::new("staging")));
    prefix.push(".");

    let staging = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(&dest.dir)
        .map_err(|source| WriteError::Resource {
            path: dest.dir.clone(),
            source,
        })?;

    debug!(staging = %staging.path().display(), "allocated staging file");
    Ok(staging)
}
