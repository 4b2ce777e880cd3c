//! Compensations for file writes that must be undone on failure

use actsync_fs::{NormalizedPath, io};

#[derive(Debug)]
enum Compensation {
    /// The file did not exist before.
    Delete(NormalizedPath),
    /// The file held these bytes before.
    Restore(NormalizedPath, Vec<u8>),
}

impl Compensation {
    fn path(&self) -> &NormalizedPath {
        match self {
            Self::Delete(path) | Self::Restore(path, _) => path,
        }
    }
}

/// Compensations recorded in write order, run in reverse only on failure.
#[derive(Debug, Default)]
pub(crate) struct Rollback {
    steps: Vec<Compensation>,
}

impl Rollback {
    /// Record the undo for writing `path` whose previous content was `previous`.
    pub(crate) fn record_write(&mut self, path: NormalizedPath, previous: Option<Vec<u8>>) {
        self.steps.push(match previous {
            Some(bytes) => Compensation::Restore(path, bytes),
            None => Compensation::Delete(path),
        });
    }

    /// Undo every recorded write, newest first.
    ///
    /// Failures are logged; the caller is already propagating the original
    /// error.
    pub(crate) fn run(self) {
        for step in self.steps.into_iter().rev() {
            let result = match &step {
                Compensation::Delete(path) => io::remove_file(path).map(|_| ()),
                Compensation::Restore(path, bytes) => io::write_atomic(path, bytes),
            };
            match result {
                Ok(()) => tracing::info!(path = %step.path(), "Rolled back file write"),
                Err(e) => tracing::warn!(path = %step.path(), error = %e, "Rollback step failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn deletes_new_files_and_restores_overwritten_ones() {
        let dir = tempdir().unwrap();
        let root = NormalizedPath::new(dir.path());
        let created = root.join("new.rs");
        let overwritten = root.join("old.rs");

        io::write_atomic(&overwritten, b"before").unwrap();

        let mut rollback = Rollback::default();
        io::write_atomic(&created, b"fresh").unwrap();
        rollback.record_write(created.clone(), None);
        io::write_atomic(&overwritten, b"after").unwrap();
        rollback.record_write(overwritten.clone(), Some(b"before".to_vec()));

        rollback.run();

        assert!(!created.exists());
        assert_eq!(std::fs::read(overwritten.to_native()).unwrap(), b"before");
    }
}
