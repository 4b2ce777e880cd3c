//! Action references and their normalized identity
//!
//! A reference is what the user types: `owner/repo`, `owner/repo@v4`,
//! `actions/cache/restore@<sha>`. Its [`ActionKey`] is the lower-cased
//! `owner/repo[/subpath]` part, which is what the manifest is keyed on. Two
//! references that differ only in case or requested ref share a key.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

static SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("segment pattern is valid"));

/// A user-supplied reference to a third-party action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReference {
    owner: String,
    repo: String,
    subpath: Option<String>,
    requested_ref: Option<String>,
}

impl ActionReference {
    /// Parse `owner/repo[/subpath...][@ref]`.
    ///
    /// A missing `@ref` means "latest". Malformed input fails with
    /// [`Error::Resolution`].
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let fail = |reason: &str| Error::resolution(input, reason);

        let (path, requested_ref) = match input.split_once('@') {
            Some((path, reference)) => {
                if reference.is_empty() {
                    return Err(fail("empty ref after '@'"));
                }
                if reference.chars().any(|c| c.is_whitespace() || c == '@') {
                    return Err(fail("ref must not contain whitespace or '@'"));
                }
                (path, Some(reference.to_string()))
            }
            None => (input, None),
        };

        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() < 2 {
            return Err(fail("expected 'owner/repo'"));
        }
        for segment in &segments {
            if segment.is_empty() || *segment == "." || *segment == ".." {
                return Err(fail("empty or relative path segment"));
            }
            if !SEGMENT.is_match(segment) {
                return Err(fail(&format!("invalid characters in '{segment}'")));
            }
        }

        let subpath = if segments.len() > 2 {
            Some(segments[2..].join("/"))
        } else {
            None
        };

        Ok(Self {
            owner: segments[0].to_string(),
            repo: segments[1].to_string(),
            subpath,
            requested_ref,
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn subpath(&self) -> Option<&str> {
        self.subpath.as_deref()
    }

    /// The raw ref the user asked for, `None` meaning latest.
    pub fn requested_ref(&self) -> Option<&str> {
        self.requested_ref.as_deref()
    }

    /// `owner/repo[/subpath]` exactly as spelled, without the ref.
    ///
    /// Git trees and some forges are case-sensitive, so this, not the key,
    /// is what gets fetched and pinned.
    pub fn path(&self) -> String {
        let mut path = format!("{}/{}", self.owner, self.repo);
        if let Some(subpath) = &self.subpath {
            path.push('/');
            path.push_str(subpath);
        }
        path
    }

    /// The normalized identity this reference is tracked under.
    pub fn key(&self) -> ActionKey {
        ActionKey(self.path().to_ascii_lowercase())
    }
}

impl fmt::Display for ActionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())?;
        if let Some(reference) = &self.requested_ref {
            write!(f, "@{reference}")?;
        }
        Ok(())
    }
}

/// Case-insensitive identity of an action: `owner/repo[/subpath]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionKey(String);

impl ActionKey {
    /// Parse a key, accepting and discarding a trailing `@ref`.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(ActionReference::parse(input)?.key())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn owner(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }

    pub fn repo(&self) -> &str {
        self.0.split('/').nth(1).unwrap_or_default()
    }

    pub fn subpath(&self) -> Option<&str> {
        self.0.splitn(3, '/').nth(2)
    }
}

impl TryFrom<String> for ActionKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        let reference = ActionReference::parse(&value)?;
        if reference.requested_ref().is_some() {
            return Err(Error::resolution(value, "manifest keys must not carry a ref"));
        }
        let key = reference.key();
        if key.0 != value {
            return Err(Error::resolution(value, "manifest keys must be lower-case"));
        }
        Ok(key)
    }
}

impl From<ActionKey> for String {
    fn from(key: ActionKey) -> Self {
        key.0
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
