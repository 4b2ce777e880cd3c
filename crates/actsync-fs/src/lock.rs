//! Advisory process locks

use std::fs::{File, OpenOptions};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// An exclusive advisory lock held for the lifetime of the guard.
///
/// The lock file itself is left on disk; only the OS-level lock is released
/// on drop.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: NormalizedPath,
}

impl LockGuard {
    /// Try to take the lock at `path` without blocking.
    ///
    /// Returns [`Error::LockFailed`] if another process holds it.
    pub fn try_acquire(path: &NormalizedPath) -> Result<Self> {
        let native = path.to_native();
        if let Some(parent) = native.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native)
            .map_err(|e| Error::io(&native, e))?;

        file.try_lock_exclusive()
            .map_err(|_| Error::LockFailed { path: native })?;

        tracing::debug!(path = %path, "Acquired lock");
        Ok(Self {
            file,
            path: path.clone(),
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path, error = %e, "Failed to release lock");
        }
    }
}
