//! SHA-256 content hashes
//!
//! A single canonical format (`sha256:<hex>`) is recorded in the manifest
//! as each binding's `contentHash` and compared on regeneration and drift
//! checks.

use sha2::{Digest, Sha256};

use crate::{NormalizedPath, Result, io};

const PREFIX: &str = "sha256:";

/// Hash content into the canonical `sha256:<hex>` form.
pub fn content_hash(content: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Hash a file's contents, or `None` if the file does not exist.
pub fn file_hash(path: &NormalizedPath) -> Result<Option<String>> {
    Ok(io::read_optional(path)?.map(content_hash))
}

/// Whether `value` is a well-formed canonical content hash.
pub fn is_content_hash(value: &str) -> bool {
    value.strip_prefix(PREFIX).is_some_and(|hex| {
        hex.len() == 64 && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    })
}
