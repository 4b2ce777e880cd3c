//! Atomic I/O operations
//!
//! Every write goes through a [`StagedFile`]: content lands in a temporary
//! file next to the target, is flushed and synced, and only then renamed
//! over the canonical path. Until the rename the previous file stays
//! readable, so an interrupted process never leaves a half-written file.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// A write that has been staged next to its target but not yet committed.
///
/// Dropping a `StagedFile` without calling [`StagedFile::commit`] removes the
/// temporary file and leaves the target untouched.
#[derive(Debug)]
pub struct StagedFile {
    target: PathBuf,
    temp: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Path of the temporary file holding the staged content.
    pub fn temp_path(&self) -> &std::path::Path {
        &self.temp
    }

    /// Path the staged content will be renamed to.
    pub fn target_path(&self) -> &std::path::Path {
        &self.target
    }

    /// Atomically rename the staged content over the target.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.temp, &self.target).map_err(|e| Error::io(&self.target, e))?;
        self.committed = true;
        tracing::debug!(path = %self.target.display(), "Committed staged write");
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed
            && let Err(e) = fs::remove_file(&self.temp)
            && e.kind() != io::ErrorKind::NotFound
        {
            tracing::warn!(
                path = %self.temp.display(),
                error = %e,
                "Failed to clean up staged temp file"
            );
        }
    }
}

/// Write `content` to a temporary sibling of `path` and return the stage.
///
/// Parent directories are created as needed. The temp file is locked while
/// written, synced to disk, and closed before this function returns.
pub fn stage(path: &NormalizedPath, content: &[u8]) -> Result<StagedFile> {
    let target = path.to_native();

    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem.
    let temp_name = format!(
        ".{}.{}.tmp",
        target
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp = target.with_file_name(&temp_name);

    let staged = StagedFile {
        target: target.clone(),
        temp: temp.clone(),
        committed: false,
    };

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp)
        .map_err(|e| Error::io(&temp, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: target.clone(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp, e))?;

    FileExt::unlock(&temp_file).map_err(|_| Error::LockFailed { path: target })?;
    drop(temp_file);

    Ok(staged)
}

/// Write content atomically to a file.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    stage(path, content)?.commit()
}

/// Read a file, returning `None` when it does not exist.
pub fn read_optional(path: &NormalizedPath) -> Result<Option<Vec<u8>>> {
    let native = path.to_native();
    match fs::read(&native) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(native, e)),
    }
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    fs::read_to_string(&native).map_err(|e| Error::io(&native, e))
}

/// Remove a file, reporting whether it was present.
///
/// A missing file is not an error: `Ok(false)` is returned instead.
pub fn remove_file(path: &NormalizedPath) -> Result<bool> {
    let native = path.to_native();
    match fs::remove_file(&native) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(native, e)),
    }
}

