//! [`Provider`] implementation over git mirrors

use std::path::Path;

use actsync_core::config::ProviderConfig;
use actsync_core::version::is_full_sha;
use actsync_core::{ActionMetadata, FetchError, Provider, RefKind, ResolvedRef};
use git2::{ErrorCode, Oid, Repository};

use crate::cache::MirrorCache;
use crate::retry::RetryPolicy;
use crate::{Error, Result};

const METADATA_FILES: [&str; 2] = ["action.yml", "action.yaml"];

/// Reads action repositories through a local bare-mirror cache.
///
/// Remote URLs come from [`ProviderConfig::url_template`], so any git
/// transport libgit2 understands works, local paths included.
pub struct GitProvider {
    cache: MirrorCache,
}

impl GitProvider {
    /// Build a provider from the `[provider]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCacheDir`] when no cache directory is configured
    /// and the platform has none.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let root = config.resolved_cache_dir().ok_or(Error::NoCacheDir)?;
        Ok(Self {
            cache: MirrorCache::new(root, config.clone()),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.cache.set_retry(retry);
        self
    }

    /// Where mirrors are kept.
    pub fn cache_dir(&self) -> &Path {
        self.cache.root()
    }

    fn tags(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let repository = self.cache.open(owner, repo)?;
        let names = repository.tag_names(None)?;
        Ok(names.iter().flatten().map(str::to_string).collect())
    }

    fn resolve(&self, owner: &str, repo: &str, reference: &str) -> Result<Option<ResolvedRef>> {
        let repository = self.cache.open(owner, repo)?;

        if let Some(sha) = peel_reference(&repository, &format!("refs/tags/{reference}"))? {
            return Ok(Some(ResolvedRef::new(sha, RefKind::Tag)));
        }
        if let Some(sha) =
            peel_reference(&repository, &format!("refs/remotes/origin/{reference}"))?
        {
            return Ok(Some(ResolvedRef::new(sha, RefKind::Branch)));
        }
        if looks_like_sha(reference) {
            return match repository.revparse_single(reference) {
                Ok(object) => {
                    let commit = object.peel_to_commit()?;
                    Ok(Some(ResolvedRef::new(commit.id().to_string(), RefKind::Commit)))
                }
                Err(e) if is_absent(&e) || e.code() == ErrorCode::Ambiguous => Ok(None),
                Err(e) => Err(e.into()),
            };
        }
        Ok(None)
    }

    fn metadata(
        &self,
        owner: &str,
        repo: &str,
        subpath: Option<&str>,
        sha: &str,
    ) -> Result<ActionMetadata> {
        if !is_full_sha(sha) {
            return Err(Error::InvalidSha {
                sha: sha.to_string(),
            });
        }
        let repository = self.cache.open(owner, repo)?;
        let commit = repository.find_commit(Oid::from_str(sha)?)?;
        let tree = commit.tree()?;

        for file in METADATA_FILES {
            let path = match subpath {
                Some(dir) => format!("{dir}/{file}"),
                None => file.to_string(),
            };
            let entry = match tree.get_path(Path::new(&path)) {
                Ok(entry) => entry,
                Err(e) if is_absent(&e) => continue,
                Err(e) => return Err(e.into()),
            };
            let blob = entry.to_object(&repository)?.peel_to_blob()?;
            let content =
                std::str::from_utf8(blob.content()).map_err(|_| Error::NotUtf8 { path })?;
            return Ok(ActionMetadata::from_yaml(content)?);
        }

        Err(Error::MetadataNotFound {
            dir: subpath.unwrap_or(".").to_string(),
        })
    }
}

impl Provider for GitProvider {
    fn list_tags(&self, owner: &str, repo: &str) -> std::result::Result<Vec<String>, FetchError> {
        self.tags(owner, repo)
            .map_err(|e| fetch_error(format!("{owner}/{repo}"), e))
    }

    fn resolve_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> std::result::Result<Option<ResolvedRef>, FetchError> {
        self.resolve(owner, repo, reference)
            .map_err(|e| fetch_error(format!("{owner}/{repo}@{reference}"), e))
    }

    fn fetch_action_metadata(
        &self,
        owner: &str,
        repo: &str,
        subpath: Option<&str>,
        sha: &str,
    ) -> std::result::Result<ActionMetadata, FetchError> {
        self.metadata(owner, repo, subpath, sha).map_err(|e| {
            let target = match subpath {
                Some(subpath) => format!("{owner}/{repo}/{subpath}@{sha}"),
                None => format!("{owner}/{repo}@{sha}"),
            };
            fetch_error(target, e)
        })
    }
}

fn fetch_error(target: String, error: Error) -> FetchError {
    tracing::warn!(%target, error = %error, "Provider request failed");
    FetchError::new(target, error)
}

/// Peel `name` to a commit sha, or `None` if the ref does not exist.
fn peel_reference(repository: &Repository, name: &str) -> Result<Option<String>> {
    match repository.find_reference(name) {
        Ok(reference) => Ok(Some(reference.peel_to_commit()?.id().to_string())),
        Err(e) if is_absent(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn is_absent(error: &git2::Error) -> bool {
    matches!(error.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec)
}

fn looks_like_sha(value: &str) -> bool {
    (7..=40).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_hexdigit())
}
