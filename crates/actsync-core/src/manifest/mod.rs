//! Persistent manifest of tracked actions
//!
//! The manifest is a versioned JSON document listing every tracked action
//! with its pin, its generated file and the hash of that file. It is loaded
//! once per engine call, mutated in memory as an explicit value, and written
//! back through a staged temp file so that the canonical file is either the
//! old or the new document, never a mix.
//!
//! ```text
//! load ──► Manifest ──► upsert/remove ... ──► persist
//!            │                                  │
//!            └─ validated: unique keys,         └─ stage → fsync → rename
//!               names and paths, full shas         (skipped if bytes equal)
//! ```

mod entry;

pub use entry::ManifestEntry;

use std::collections::HashSet;

use actsync_fs::{NormalizedPath, StagedFile, io, is_content_hash, validate_relative_path};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CollisionField;
use crate::naming::is_valid_binding_name;
use crate::reference::{ActionKey, ActionReference};
use crate::version::is_full_sha;
use crate::{Error, Result};

/// Schema version written to and accepted from disk.
pub const MANIFEST_VERSION: u64 = 1;

/// Default manifest file name, relative to the project root.
pub const DEFAULT_MANIFEST_FILE: &str = "actsync.lock.json";

/// The in-memory manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    version: u64,
    #[serde(default)]
    entries: Vec<ManifestEntry>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest {
    /// An empty manifest at the current schema version.
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &ActionKey) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    pub fn contains(&self, key: &ActionKey) -> bool {
        self.get(key).is_some()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<ActionKey> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }

    /// Fail if a different key already owns `binding_name` or `output_path`.
    pub fn check_unique(&self, key: &ActionKey, binding_name: &str, output_path: &str) -> Result<()> {
        for entry in self.entries.iter().filter(|e| &e.key != key) {
            if entry.binding_name == binding_name {
                return Err(Error::NameCollision {
                    field: CollisionField::BindingName,
                    value: binding_name.to_string(),
                    existing: entry.key.to_string(),
                });
            }
            if entry.output_file_path == output_path {
                return Err(Error::NameCollision {
                    field: CollisionField::OutputPath,
                    value: output_path.to_string(),
                    existing: entry.key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Insert `entry`, or replace the entry with the same key in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameCollision`] when another key already uses the
    /// entry's binding name or output path. The manifest is unchanged then.
    pub fn upsert(&mut self, entry: ManifestEntry) -> Result<()> {
        self.check_unique(&entry.key, &entry.binding_name, &entry.output_file_path)?;

        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
        Ok(())
    }

    /// Remove the entry for `key`, returning it if it was tracked.
    pub fn remove(&mut self, key: &ActionKey) -> Option<ManifestEntry> {
        let pos = self.entries.iter().position(|e| &e.key == key)?;
        Some(self.entries.remove(pos))
    }

    /// Serialized form: pretty JSON with a trailing newline.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Parse and validate a manifest document.
    fn parse(bytes: &[u8]) -> std::result::Result<Self, String> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;

        match value.get("version") {
            Some(Value::Number(n)) if n.as_u64() == Some(MANIFEST_VERSION) => {}
            Some(other) => return Err(format!("unsupported manifest version {other}")),
            None => return Err("missing 'version' field".to_string()),
        }

        let manifest: Manifest = serde_json::from_value(value).map_err(|e| e.to_string())?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let mut keys = HashSet::new();
        let mut names = HashSet::new();
        let mut paths = HashSet::new();

        for entry in &self.entries {
            let key = &entry.key;
            if !keys.insert(key) {
                return Err(format!("duplicate key '{key}'"));
            }
            if !names.insert(entry.binding_name.as_str()) {
                return Err(format!("duplicate binding name '{}'", entry.binding_name));
            }
            if !paths.insert(entry.output_file_path.as_str()) {
                return Err(format!("duplicate output path '{}'", entry.output_file_path));
            }
            if let Some(source) = &entry.source {
                let spelled = ActionReference::parse(source)
                    .ok()
                    .filter(|r| r.requested_ref().is_none());
                if spelled.map(|r| r.key()).as_ref() != Some(key) {
                    return Err(format!("'{key}' has mismatched source '{source}'"));
                }
            }
            if !is_full_sha(&entry.resolved_sha) {
                return Err(format!("'{key}' has invalid resolvedSha '{}'", entry.resolved_sha));
            }
            if !is_content_hash(&entry.content_hash) {
                return Err(format!("'{key}' has invalid contentHash '{}'", entry.content_hash));
            }
            if !is_valid_binding_name(&entry.binding_name) {
                return Err(format!("'{key}' has invalid bindingName '{}'", entry.binding_name));
            }
            validate_relative_path(&entry.output_file_path)
                .map_err(|e| format!("'{key}' has invalid outputFilePath: {e}"))?;
        }
        Ok(())
    }
}

/// Loads and persists the manifest file.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: NormalizedPath,
}

/// Exclusive advisory lock on a manifest, released on drop.
#[derive(Debug)]
pub struct ManifestLock {
    _guard: actsync_fs::LockGuard,
}

impl ManifestStore {
    pub fn new(path: impl Into<NormalizedPath>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the manifest file.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    fn lock_path(&self) -> NormalizedPath {
        NormalizedPath::new(format!("{}.lock", self.path.as_str()))
    }

    /// Load the manifest, or an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestCorrupt`] for unreadable JSON, a wrong shape,
    /// an unsupported version, or violated uniqueness invariants.
    pub fn load(&self) -> Result<Manifest> {
        let Some(bytes) = io::read_optional(&self.path)? else {
            tracing::debug!(path = %self.path, "No manifest on disk, starting empty");
            return Ok(Manifest::new());
        };

        let manifest = Manifest::parse(&bytes).map_err(|reason| Error::ManifestCorrupt {
            path: self.path.to_native(),
            reason,
        })?;
        tracing::debug!(path = %self.path, entries = manifest.len(), "Loaded manifest");
        Ok(manifest)
    }

    /// Write the manifest atomically. Returns whether the file changed.
    ///
    /// Nothing is written when the serialized bytes equal what is on disk.
    pub fn persist(&self, manifest: &Manifest) -> Result<bool> {
        let bytes = manifest.to_bytes()?;
        if io::read_optional(&self.path)?.as_deref() == Some(bytes.as_slice()) {
            tracing::debug!(path = %self.path, "Manifest unchanged, skipping write");
            return Ok(false);
        }

        io::stage(&self.path, &bytes)?.commit()?;
        tracing::info!(path = %self.path, entries = manifest.len(), "Persisted manifest");
        Ok(true)
    }

    /// Stage the serialized manifest without committing it.
    ///
    /// The canonical file is untouched until [`StagedFile::commit`]; dropping
    /// the stage removes the temp file.
    pub fn stage(&self, manifest: &Manifest) -> Result<StagedFile> {
        Ok(io::stage(&self.path, &manifest.to_bytes()?)?)
    }

    /// Take the exclusive lock on `<manifest>.lock` without blocking.
    pub fn lock(&self) -> Result<ManifestLock> {
        match actsync_fs::LockGuard::try_acquire(&self.lock_path()) {
            Ok(guard) => Ok(ManifestLock { _guard: guard }),
            Err(actsync_fs::Error::LockFailed { .. }) => Err(Error::ManifestLocked {
                path: self.path.to_native(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
