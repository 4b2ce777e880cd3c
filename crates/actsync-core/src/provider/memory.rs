//! In-memory provider
//!
//! Holds tags, branches and metadata per repository. Clones share state, so
//! a test can keep a handle and "publish" upstream changes while a
//! [`crate::SyncEngine`] owns another clone.
//!
//! Names are matched exactly, like paths in a git tree.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{FetchError, Provider, RefKind, ResolvedRef};
use crate::metadata::ActionMetadata;
use crate::version::is_full_sha;

#[derive(Debug, Default)]
struct MemoryRepo {
    tags: BTreeMap<String, String>,
    branches: BTreeMap<String, String>,
    /// `(subpath, sha)` to metadata.
    metadata: HashMap<(Option<String>, String), ActionMetadata>,
}

#[derive(Debug, Default)]
struct State {
    repos: BTreeMap<String, MemoryRepo>,
    failures: HashMap<String, String>,
    metadata_fetches: Vec<String>,
}

/// A [`Provider`] backed by in-process maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    state: Arc<Mutex<State>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Point `tag` of `owner/repo` at `sha`, creating the repo if needed.
    pub fn publish_tag(&self, repository: &str, tag: &str, sha: &str) {
        self.state()
            .repos
            .entry(repository.to_string())
            .or_default()
            .tags
            .insert(tag.to_string(), sha.to_string());
    }

    /// Point `branch` of `owner/repo` at `sha`.
    pub fn publish_branch(&self, repository: &str, branch: &str, sha: &str) {
        self.state()
            .repos
            .entry(repository.to_string())
            .or_default()
            .branches
            .insert(branch.to_string(), sha.to_string());
    }

    /// Set the metadata served for `owner/repo[/subpath]` at `sha`.
    pub fn publish_metadata(&self, action: &str, sha: &str, metadata: ActionMetadata) {
        let mut parts = action.splitn(3, '/');
        let owner = parts.next().unwrap_or_default();
        let repo = parts.next().unwrap_or_default();
        let subpath = parts.next().map(str::to_string);

        self.state()
            .repos
            .entry(format!("{owner}/{repo}"))
            .or_default()
            .metadata
            .insert((subpath, sha.to_string()), metadata);
    }

    /// Make every call for `owner/repo` fail until cleared.
    pub fn fail_repository(&self, repository: &str, cause: &str) {
        self.state()
            .failures
            .insert(repository.to_string(), cause.to_string());
    }

    pub fn clear_failure(&self, repository: &str) {
        self.state().failures.remove(repository);
    }

    /// `owner/repo[/subpath]@sha` for each metadata fetch, in call order.
    pub fn metadata_fetches(&self) -> Vec<String> {
        self.state().metadata_fetches.clone()
    }

    fn with_repo<T>(
        &self,
        owner: &str,
        repo: &str,
        target: &str,
        f: impl FnOnce(&MemoryRepo) -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        let name = format!("{owner}/{repo}");
        let state = self.state();
        if let Some(cause) = state.failures.get(&name) {
            return Err(FetchError::new(target, cause));
        }
        let repo = state
            .repos
            .get(&name)
            .ok_or_else(|| FetchError::new(target, "repository not found"))?;
        f(repo)
    }
}

impl Provider for MemoryProvider {
    fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<String>, FetchError> {
        let target = format!("{owner}/{repo}");
        self.with_repo(owner, repo, &target, |r| Ok(r.tags.keys().cloned().collect()))
    }

    fn resolve_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> Result<Option<ResolvedRef>, FetchError> {
        let target = format!("{owner}/{repo}@{reference}");
        self.with_repo(owner, repo, &target, |r| {
            if let Some(sha) = r.tags.get(reference) {
                return Ok(Some(ResolvedRef::new(sha.clone(), RefKind::Tag)));
            }
            if let Some(sha) = r.branches.get(reference) {
                return Ok(Some(ResolvedRef::new(sha.clone(), RefKind::Branch)));
            }
            let sha = reference.to_ascii_lowercase();
            let known = r.metadata.keys().any(|(_, s)| *s == sha);
            Ok((is_full_sha(&sha) && known).then(|| ResolvedRef::new(sha, RefKind::Commit)))
        })
    }

    fn fetch_action_metadata(
        &self,
        owner: &str,
        repo: &str,
        subpath: Option<&str>,
        sha: &str,
    ) -> Result<ActionMetadata, FetchError> {
        let action = match subpath {
            Some(subpath) => format!("{owner}/{repo}/{subpath}"),
            None => format!("{owner}/{repo}"),
        };
        let target = format!("{action}@{sha}");

        let metadata = self.with_repo(owner, repo, &target, |r| {
            let subpath = subpath.map(str::to_string);
            r.metadata
                .get(&(subpath, sha.to_string()))
                .cloned()
                .ok_or_else(|| FetchError::new(&target, "no action.yml at this commit"))
        })?;

        self.state().metadata_fetches.push(target);
        Ok(metadata)
    }
}
