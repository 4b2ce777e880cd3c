//! Local git remotes that look like action repositories.
//!
//! Every repository lives at `<root>/<owner>/<repo>.git`, so a single
//! [`ActionRemotes::url_template`] lets a provider reach all of them
//! offline through git's local transport.

use std::fs;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

/// A temporary directory holding any number of action repositories.
pub struct ActionRemotes {
    root: TempDir,
}

impl Default for ActionRemotes {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRemotes {
    pub fn new() -> Self {
        Self {
            root: TempDir::new()
                .unwrap_or_else(|e| panic!("ActionRemotes::new: failed to create temp dir: {e}")),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// URL template resolving `{owner}/{repo}` to the local repositories.
    pub fn url_template(&self) -> String {
        let root = self.root().display().to_string().replace('\\', "/");
        format!("{root}/{{owner}}/{{repo}}.git")
    }

    /// Initialise an empty repository for `owner/repo`.
    ///
    /// # Panics
    /// Panics if the repository cannot be created.
    pub fn create(&self, owner: &str, repo: &str) -> ActionRepo {
        let path = self.root().join(owner).join(format!("{repo}.git"));
        fs::create_dir_all(&path)
            .unwrap_or_else(|e| panic!("ActionRemotes::create: {}: {e}", path.display()));
        let repo = Repository::init(&path)
            .unwrap_or_else(|e| panic!("ActionRemotes::create: git init failed: {e}"));
        ActionRepo { repo, path }
    }
}

/// One action repository with a working tree.
pub struct ActionRepo {
    repo: Repository,
    path: PathBuf,
}

impl ActionRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `files` (relative path, content) and commit them on HEAD.
    ///
    /// Returns the new commit sha.
    ///
    /// # Panics
    /// Panics if any file or git operation fails.
    pub fn commit_files(&self, files: &[(&str, &str)], message: &str) -> String {
        let mut index = self
            .repo
            .index()
            .unwrap_or_else(|e| panic!("commit_files: cannot open index: {e}"));

        for (relative, content) in files {
            let full = self.path.join(relative);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)
                    .unwrap_or_else(|e| panic!("commit_files: {}: {e}", parent.display()));
            }
            fs::write(&full, content)
                .unwrap_or_else(|e| panic!("commit_files: {}: {e}", full.display()));
            index
                .add_path(Path::new(relative))
                .unwrap_or_else(|e| panic!("commit_files: cannot stage {relative}: {e}"));
        }
        index
            .write()
            .unwrap_or_else(|e| panic!("commit_files: cannot write index: {e}"));

        let tree_id = index
            .write_tree()
            .unwrap_or_else(|e| panic!("commit_files: cannot write tree: {e}"));
        let tree = self
            .repo
            .find_tree(tree_id)
            .unwrap_or_else(|e| panic!("commit_files: cannot find tree: {e}"));
        let signature = signature();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap_or_else(|e| panic!("commit_files: commit failed: {e}"))
            .to_string()
    }

    /// Commit an `action.yml` at the repository root or under `subpath`.
    pub fn commit_action(&self, subpath: Option<&str>, yaml: &str) -> String {
        let file = match subpath {
            Some(subpath) => format!("{subpath}/action.yml"),
            None => "action.yml".to_string(),
        };
        self.commit_files(&[(file.as_str(), yaml)], "Update action metadata")
    }

    /// Point a lightweight tag at `sha`, moving it if it exists.
    pub fn tag(&self, name: &str, sha: &str) {
        let object = self.object(sha);
        self.repo
            .tag_lightweight(name, &object, true)
            .unwrap_or_else(|e| panic!("tag: cannot create {name}: {e}"));
    }

    /// Point an annotated tag at `sha`, moving it if it exists.
    pub fn annotated_tag(&self, name: &str, sha: &str) {
        let object = self.object(sha);
        self.repo
            .tag(name, &object, &signature(), &format!("Release {name}"), true)
            .unwrap_or_else(|e| panic!("annotated_tag: cannot create {name}: {e}"));
    }

    /// Point a branch at `sha`, moving it if it exists.
    pub fn branch(&self, name: &str, sha: &str) {
        let commit = self
            .repo
            .find_commit(oid(sha))
            .unwrap_or_else(|e| panic!("branch: unknown commit {sha}: {e}"));
        self.repo
            .branch(name, &commit, true)
            .unwrap_or_else(|e| panic!("branch: cannot create {name}: {e}"));
    }

    fn object(&self, sha: &str) -> git2::Object<'_> {
        self.repo
            .find_object(oid(sha), None)
            .unwrap_or_else(|e| panic!("unknown object {sha}: {e}"))
    }
}

fn oid(sha: &str) -> Oid {
    Oid::from_str(sha).unwrap_or_else(|e| panic!("invalid sha {sha}: {e}"))
}

fn signature() -> Signature<'static> {
    Signature::now("actsync tests", "tests@example.com")
        .unwrap_or_else(|e| panic!("cannot build signature: {e}"))
}

/// A small `action.yml` document.
///
/// Each input is `(name, required)`; outputs are names only.
pub fn action_yaml(description: &str, inputs: &[(&str, bool)], outputs: &[&str]) -> String {
    let mut yaml = format!("name: test action\ndescription: '{description}'\n");
    if !inputs.is_empty() {
        yaml.push_str("inputs:\n");
        for (name, required) in inputs {
            yaml.push_str(&format!(
                "  {name}:\n    description: 'The {name} input'\n    required: {required}\n"
            ));
        }
    }
    if !outputs.is_empty() {
        yaml.push_str("outputs:\n");
        for name in outputs {
            yaml.push_str(&format!("  {name}:\n    description: 'The {name} output'\n"));
        }
    }
    yaml.push_str("runs:\n  using: node20\n  main: index.js\n");
    yaml
}
