//! Drift detection between the manifest and generated files

use actsync_fs::{NormalizedPath, file_hash};
use serde::Serialize;

use crate::Result;
use crate::manifest::Manifest;
use crate::reference::ActionKey;

/// State of one generated file relative to its recorded hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStatus {
    /// The file matches the recorded hash
    Clean,
    /// The file exists with different content
    Modified,
    /// The file is gone
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftItem {
    pub key: ActionKey,
    pub file: String,
    pub status: DriftStatus,
    pub expected_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_hash: Option<String>,
}

/// One [`DriftItem`] per tracked action, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub items: Vec<DriftItem>,
}

impl DriftReport {
    /// True when every file matches its recorded hash.
    pub fn is_clean(&self) -> bool {
        self.items.iter().all(|i| i.status == DriftStatus::Clean)
    }

    /// Items that are not clean.
    pub fn drifted(&self) -> impl Iterator<Item = &DriftItem> {
        self.items.iter().filter(|i| i.status != DriftStatus::Clean)
    }

    pub fn count(&self, status: DriftStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }
}

/// Hash every tracked file below `root` and compare with the manifest.
pub(crate) fn check_manifest(root: &NormalizedPath, manifest: &Manifest) -> Result<DriftReport> {
    let mut items = Vec::with_capacity(manifest.len());

    for entry in manifest.entries() {
        let actual_hash = file_hash(&root.join(&entry.output_file_path))?;
        let status = match &actual_hash {
            None => DriftStatus::Missing,
            Some(hash) if *hash == entry.content_hash => DriftStatus::Clean,
            Some(_) => DriftStatus::Modified,
        };
        if status != DriftStatus::Clean {
            tracing::debug!(key = %entry.key, file = %entry.output_file_path, ?status, "Drift detected");
        }

        items.push(DriftItem {
            key: entry.key.clone(),
            file: entry.output_file_path.clone(),
            status,
            expected_hash: entry.content_hash.clone(),
            actual_hash,
        });
    }

    Ok(DriftReport { items })
}
