//! `atomicwriter` — atomic file creation and replacement.
//!
//! Stages content in a hidden temporary file inside the destination's
//! directory, forces it to stable storage, then publishes it with a single
//! atomic rename. Readers of the destination observe either the old content
//! or the new content in full — never a partial write, never a momentarily
//! missing file.
//!
//! # API
//!
//! - [`write_bytes`] / [`write_text`] — one-shot atomic writes
//! - [`AtomicWriter`] — stateful handle for assembling content across
//!   several writes before a single commit
//!
//! Both front-ends run the same engine: resolve the destination, stage,
//! fsync, publish, clean up on every failure path.
//!
//! # Usage
//!
//! ```no_run
//! let path = atomicwriter::write_text("hello world", "config.toml", false)?;
//! # Ok::<(), atomicwriter::WriteError>(())
//! ```
//!
//! Incremental staging via the handle:
//!
//! ```no_run
//! use atomicwriter::AtomicWriter;
//!
//! let mut writer = AtomicWriter::open("snapshot.bin", true)?;
//! writer.write_bytes(b"header")?;
//! writer.write_bytes(b"body")?;
//! let path = writer.commit()?;
//! # Ok::<(), atomicwriter::WriteError>(())
//! ```
//!
//! Dropping a writer without committing removes the staging file and leaves
//! the destination untouched, so a plain scope gives commit-or-discard
//! semantics.
//!
//! Overwriting is opt-in: with `overwrite = false` a commit against an
//! existing destination fails with [`WriteError::DestinationExists`] and
//! the old content survives byte for byte.

pub mod error;
mod path;
mod publish;
mod staging;
mod writer;

pub use error::{WriteError, WriteResult};
pub use writer::AtomicWriter;

use std::path::{Path, PathBuf};

/// Atomically write `data` to `destination`, returning the resolved
/// absolute destination path.
///
/// Accepts anything path-like (`&str`, `String`, `Path`, `PathBuf`, or any
/// `AsRef<Path>` type); relative paths resolve against the current working
/// directory.
///
/// # Errors
///
/// See [`AtomicWriter::open`] and [`AtomicWriter::commit`]; in every error
/// case the destination is left untouched and no staging file remains.
pub fn write_bytes(
    data: &[u8],
    destination: impl AsRef<Path>,
    overwrite: bool,
) -> WriteResult<PathBuf> {
    let mut writer = AtomicWriter::open(destination, overwrite)?;
    writer.write_bytes(data)?;
    writer.commit()
}

/// Atomically write `data` to `destination` as UTF-8, returning the
/// resolved absolute destination path.
///
/// # Errors
///
/// Same as [`write_bytes`].
pub fn write_text(
    data: &str,
    destination: impl AsRef<Path>,
    overwrite: bool,
) -> WriteResult<PathBuf> {
    write_bytes(data.as_bytes(), destination, overwrite)
}
