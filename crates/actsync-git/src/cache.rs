//! Bare mirror cache of action repositories
//!
//! Each `owner/repo` gets a bare repository under the cache root. Tags are
//! mirrored as `refs/tags/*` and branches as `refs/remotes/origin/*`. A
//! mirror is fetched at most once per [`MirrorCache`] so that every lookup in
//! one run sees the same snapshot.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use actsync_core::config::ProviderConfig;
use git2::{AutotagOption, FetchOptions, FetchPrune, Repository};

use crate::Result;
use crate::retry::RetryPolicy;

const REMOTE: &str = "origin";
const REFSPECS: [&str; 2] = [
    "+refs/tags/*:refs/tags/*",
    "+refs/heads/*:refs/remotes/origin/*",
];

pub(crate) struct MirrorCache {
    root: PathBuf,
    config: ProviderConfig,
    retry: RetryPolicy,
    fetched: Mutex<HashSet<String>>,
}

impl MirrorCache {
    pub(crate) fn new(root: PathBuf, config: ProviderConfig) -> Self {
        Self {
            root,
            config,
            retry: RetryPolicy::default(),
            fetched: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn set_retry(&mut self, retry: RetryPolicy) {
        self.retry = retry;
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    fn mirror_path(&self, owner: &str, repo: &str) -> PathBuf {
        self.root
            .join(owner.to_ascii_lowercase())
            .join(format!("{}.git", repo.to_ascii_lowercase()))
    }

    /// Open the mirror for `owner/repo`, fetching it first if this cache
    /// has not done so yet.
    pub(crate) fn open(&self, owner: &str, repo: &str) -> Result<Repository> {
        let path = self.mirror_path(owner, repo);
        let repository = if path.join("HEAD").is_file() {
            Repository::open_bare(&path)?
        } else {
            fs::create_dir_all(&path).map_err(|e| actsync_fs::Error::io(&path, e))?;
            tracing::debug!(path = %path.display(), "Initialising mirror");
            Repository::init_bare(&path)?
        };

        let slug = format!("{owner}/{repo}").to_ascii_lowercase();
        let already_fetched = self
            .fetched
            .lock()
            .map(|set| set.contains(&slug))
            .unwrap_or(false);
        if !already_fetched {
            self.fetch(&repository, owner, repo)?;
            if let Ok(mut set) = self.fetched.lock() {
                set.insert(slug);
            }
        }

        Ok(repository)
    }

    fn fetch(&self, repository: &Repository, owner: &str, repo: &str) -> Result<()> {
        let url = self.config.repository_url(owner, repo);
        let mut remote = match repository.find_remote(REMOTE) {
            Ok(remote) if remote.url() == Some(url.as_str()) => remote,
            Ok(_) => {
                repository.remote_set_url(REMOTE, &url)?;
                repository.find_remote(REMOTE)?
            }
            Err(_) => {
                repository.remote_with_fetch(REMOTE, &url, REFSPECS[0])?;
                repository.remote_add_fetch(REMOTE, REFSPECS[1])?;
                repository.find_remote(REMOTE)?
            }
        };

        tracing::info!(%url, "Fetching action repository");
        self.retry.run(&url, || {
            let mut options = FetchOptions::new();
            options.prune(FetchPrune::On);
            options.download_tags(AutotagOption::None);
            remote.fetch(&REFSPECS, Some(&mut options), None)
        })?;
        Ok(())
    }
}
