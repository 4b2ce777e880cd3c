//! [`TestProject`] builder for a project that consumes actions.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::git::ActionRemotes;

/// A temporary project directory with an `actsync.toml` pointing at local
/// remotes and a private clone cache.
pub struct TestProject {
    temp_dir: TempDir,
}

impl TestProject {
    /// Create a project wired to `remotes`.
    pub fn new(remotes: &ActionRemotes) -> Self {
        let temp_dir =
            TempDir::new().unwrap_or_else(|e| panic!("TestProject::new: temp dir: {e}"));
        let cache = temp_dir.path().join(".cache").display().to_string().replace('\\', "/");
        let config = format!(
            "[provider]\nurl_template = \"{}\"\ncache_dir = \"{cache}\"\n",
            remotes.url_template()
        );
        fs::write(temp_dir.path().join("actsync.toml"), config)
            .unwrap_or_else(|e| panic!("TestProject::new: cannot write actsync.toml: {e}"));
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Read a file relative to the root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Could not read {}: {e}", full_path.display()))
    }

    /// Assert that `path` (relative to the root) exists.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}
