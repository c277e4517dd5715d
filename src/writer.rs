//! The stateful atomic writer.
//!
//! Orchestrates the stage → flush → publish → cleanup lifecycle. Content
//! accumulates in the staging file while the writer is open; `commit()`
//! consumes the writer and performs the single atomic publish. Dropping an
//! uncommitted writer removes the staging file and leaves the destination
//! untouched, so wrapping the writer in an ordinary scope gives the
//! commit-or-discard guarantee without any finalizer tricks.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{WriteError, WriteResult};
use crate::path::{self, ResolvedDest};
use crate::{publish, staging};

/// Writer lifecycle. A failed write discards the staging file, after which
/// every further operation is a usage error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Committed,
    Failed,
}

/// Stages content in a hidden temporary file next to the destination and
/// atomically publishes it on [`commit`](Self::commit).
///
/// While the writer is open the destination is unmodified; at the instant
/// of commit, readers opening the destination see either the fully-old or
/// the fully-new content, never a mix and never a missing file.
#[derive(Debug)]
pub struct AtomicWriter {
    dest: ResolvedDest,
    overwrite: bool,
    staging: Option<NamedTempFile>,
    state: State,
}

impl AtomicWriter {
    /// Open a writer targeting `destination`.
    ///
    /// The destination is resolved immediately (symlinks and relative
    /// segments, against the current working directory) and the staging
    /// file is created in the resolved directory.
    ///
    /// # Errors
    ///
    /// [`WriteError::InvalidPath`] if the destination cannot be resolved or
    /// its parent directory does not exist; [`WriteError::Resource`] if the
    /// staging file cannot be created.
    pub fn open(destination: impl AsRef<Path>, overwrite: bool) -> WriteResult<Self> {
        let dest = path::resolve_destination(destination.as_ref())?;
        let staging = staging::allocate(&dest)?;
        debug!(dest = %dest.path.display(), overwrite, "opened atomic writer");
        Ok(Self {
            dest,
            overwrite,
            staging: Some(staging),
            state: State::Open,
        })
    }

    /// The resolved absolute path this writer publishes to.
    pub fn destination(&self) -> &Path {
        &self.dest.path
    }

    /// Whether commit may replace an existing destination.
    pub const fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Append raw bytes to the staged content.
    ///
    /// # Errors
    ///
    /// [`WriteError::Resource`] if the write fails, in which case the
    /// staging file is removed and the writer is no longer usable;
    /// [`WriteError::Usage`] if the writer is not open.
    pub fn write_bytes(&mut self, data: &[u8]) -> WriteResult<()> {
        let result = self.staging_mut()?.write_all(data);
        if let Err(source) = result {
            self.fail();
            return Err(WriteError::Resource {
                path: self.dest.path.clone(),
                source,
            });
        }
        Ok(())
    }

    /// Append text to the staged content as UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Same as [`write_bytes`](Self::write_bytes).
    pub fn write_text(&mut self, data: &str) -> WriteResult<()> {
        self.write_bytes(data.as_bytes())
    }

    /// Atomically publish the staged content and return the resolved
    /// destination path.
    ///
    /// The staging file is flushed to stable storage first; the publish is
    /// a single atomic rename. On any failure the staging file is removed
    /// and the destination is guaranteed unchanged.
    ///
    /// # Errors
    ///
    /// [`WriteError::DestinationExists`] if overwrite was not requested and
    /// the destination is present; [`WriteError::ResourceBusy`] if the
    /// platform refuses the replace; [`WriteError::Resource`] for other
    /// filesystem failures; [`WriteError::Usage`] if the writer is not
    /// open.
    pub fn commit(mut self) -> WriteResult<PathBuf> {
        if self.state != State::Open {
            return Err(WriteError::Usage("commit on a writer that is not open"));
        }
        let staging = self
            .staging
            .take()
            .ok_or(WriteError::Usage("staging file already consumed"))?;

        match publish::publish(staging, &self.dest, self.overwrite) {
            Ok(()) => {
                self.state = State::Committed;
                debug!(dest = %self.dest.path.display(), "commit complete");
                Ok(self.dest.path.clone())
            }
            Err(err) => {
                self.state = State::Failed;
                Err(err)
            }
        }
    }

    /// Remove the staging file without touching the destination.
    ///
    /// Dropping the writer does the same; this just makes the abandonment
    /// explicit at call sites.
    pub fn discard(mut self) {
        if let Some(staging) = self.staging.take() {
            debug!(dest = %self.dest.path.display(), "discarding staged content");
            discard_staging(staging);
        }
        self.state = State::Failed;
    }

    fn staging_mut(&mut self) -> WriteResult<&mut NamedTempFile> {
        if self.state != State::Open {
            return Err(WriteError::Usage("write on a writer that is not open"));
        }
        self.staging
            .as_mut()
            .ok_or(WriteError::Usage("staging file already consumed"))
    }

    /// A staging I/O failure poisons the writer: the temp file is removed
    /// and the destination is never touched.
    fn fail(&mut self) {
        self.state = State::Failed;
        if let Some(staging) = self.staging.take() {
            discard_staging(staging);
        }
    }
}

impl Drop for AtomicWriter {
    fn drop(&mut self) {
        // Abandonment: scope exit without commit. The staging file must go;
        // the destination stays as it was.
        if let Some(staging) = self.staging.take() {
            debug!(dest = %self.dest.path.display(), "discarding abandoned staging file");
            discard_staging(staging);
        }
    }
}

/// Best-effort removal of a staging file. A failure is reported, never
/// raised, so it cannot mask whatever error put us on this path.
fn discard_staging(staging: NamedTempFile) {
    let staging_path = staging.path().to_path_buf();
    if let Err(err) = staging.close() {
        warn!(staging = %staging_path.display(), error = %err, "failed to remove staging file");
    }
}
