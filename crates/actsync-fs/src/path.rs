//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Manifest entries record output paths in this form so the manifest
/// diffs identically on every platform. Conversion to a native path only
/// happens at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Backslashes become forward slashes and repeated separators collapse.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: normalize(&path.as_ref().to_string_lossy()),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a relative segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment = normalize(segment);
        let segment = segment.trim_start_matches("./");
        if segment.is_empty() || segment == "." {
            return self.clone();
        }
        if self.inner.is_empty() || self.inner == "." {
            return Self {
                inner: segment.to_string(),
            };
        }
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment)
        } else {
            format!("{}/{}", self.inner, segment)
        };
        Self { inner: joined }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

/// Collapse separators while keeping a leading `//` (UNC) intact.
fn normalize(raw: &str) -> String {
    let replaced = raw.replace('\\', "/");
    let (prefix, rest) = if replaced.starts_with("//") && !replaced.starts_with("///") {
        ("//", &replaced[2..])
    } else {
        ("", replaced.as_str())
    };

    let mut out = String::with_capacity(replaced.len());
    out.push_str(prefix);
    let mut previous_slash = false;
    for ch in rest.chars() {
        if ch == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(ch);
    }
    out
}

/// Validate a project-relative path recorded in the manifest.
///
/// Rejects absolute paths, drive prefixes and any `..` component so that
/// generated files can never land outside the project root.
pub fn validate_relative_path(path: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let normalized = normalize(path);
    if normalized.is_empty() {
        return Err(invalid("path is empty"));
    }
    if normalized.starts_with('/') {
        return Err(invalid("path must be relative"));
    }
    if normalized.len() >= 2 && normalized.as_bytes()[1] == b':' {
        return Err(invalid("path must not carry a drive prefix"));
    }
    if normalized.split('/').any(|component| component == "..") {
        return Err(invalid("path must not contain '..'"));
    }
    Ok(())
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("src/actions/checkout.rs")]
    #[case("bindings.rs")]
    #[case("./gen/cache_restore.rs")]
    fn accepts_relative_paths(#[case] path: &str) {
        assert!(validate_relative_path(path).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("/etc/passwd")]
    #[case("C:/Windows/evil.rs")]
    #[case("src/../../outside.rs")]
    #[case("..\\outside.rs")]
    fn rejects_escaping_paths(#[case] path: &str) {
        assert!(matches!(
            validate_relative_path(path),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn join_onto_dot_drops_the_dot() {
        let joined = NormalizedPath::new(".").join("src/actions");
        assert_eq!(joined.as_str(), "src/actions");
    }
}
