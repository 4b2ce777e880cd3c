//! Source repository provider seam
//!
//! The engine never talks to a forge directly. Everything it needs from an
//! action's repository goes through [`Provider`]: the tag list, ref-to-sha
//! resolution, and the parsed metadata at a pinned commit. Implementations
//! own transport, authentication and any retry policy.

mod memory;

pub use memory::MemoryProvider;

use crate::metadata::ActionMetadata;

/// The single failure type a provider reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to fetch {target}: {cause}")]
pub struct FetchError {
    /// What was being fetched, e.g. `actions/checkout@v4`.
    pub target: String,
    /// Human-readable cause.
    pub cause: String,
}

impl FetchError {
    pub fn new(target: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self {
            target: target.into(),
            cause: cause.to_string(),
        }
    }
}

/// What kind of ref a name resolved through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Tag,
    Branch,
    Commit,
}

/// A ref resolved to an immutable commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef {
    pub sha: String,
    pub kind: RefKind,
}

impl ResolvedRef {
    pub fn new(sha: impl Into<String>, kind: RefKind) -> Self {
        Self {
            sha: sha.into(),
            kind,
        }
    }
}

/// Read access to action source repositories.
pub trait Provider {
    /// All tag names of `owner/repo`.
    fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<String>, FetchError>;

    /// Resolve a tag, branch or sha to a commit.
    ///
    /// Returns `Ok(None)` when the repository exists but has no such ref.
    fn resolve_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> Result<Option<ResolvedRef>, FetchError>;

    /// Parsed `action.yml` of `owner/repo[/subpath]` at commit `sha`.
    fn fetch_action_metadata(
        &self,
        owner: &str,
        repo: &str,
        subpath: Option<&str>,
        sha: &str,
    ) -> Result<ActionMetadata, FetchError>;
}
