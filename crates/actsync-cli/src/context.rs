//! Project context for one invocation
//!
//! Resolves the project root, loads `actsync.toml` and wires the engine to
//! the git provider.

use std::path::{Path, PathBuf};

use actsync_core::{Config, SyncEngine, SyncOptions};
use actsync_fs::NormalizedPath;
use actsync_git::GitProvider;

use crate::error::{CliError, Result};

/// Flags shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalArgs {
    pub json: bool,
    pub dry_run: bool,
}

pub struct Project {
    root: NormalizedPath,
    config: Config,
}

impl Project {
    /// Open the project at `root`, or at the current directory.
    pub fn open(root: Option<&Path>) -> Result<Self> {
        let requested = match root {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let canonical = canonicalize(&requested)?;
        tracing::debug!(root = %canonical.display(), "Project root");

        let root = NormalizedPath::new(canonical);
        let config = Config::load(&root)?;
        Ok(Self { root, config })
    }

    /// Build an engine backed by the git provider.
    pub fn engine(&self, args: GlobalArgs) -> Result<SyncEngine> {
        let provider = GitProvider::new(&self.config.provider)?;
        Ok(
            SyncEngine::new(self.root.clone(), self.config.clone(), provider)
                .with_options(SyncOptions {
                    dry_run: args.dry_run,
                }),
        )
    }
}

fn canonicalize(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(CliError::user(format!(
            "Project root '{}' is not a directory",
            path.display()
        )));
    }
    Ok(dunce::canonicalize(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_is_a_user_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let result = Project::open(Some(&missing));

        assert!(matches!(result, Err(CliError::User { .. })));
    }

    #[test]
    fn opens_project_without_config() {
        let temp = tempfile::TempDir::new().unwrap();

        let project = Project::open(Some(temp.path())).unwrap();

        assert_eq!(project.config, Config::default());
    }
}
