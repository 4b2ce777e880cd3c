//! Manifest entry

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::reference::ActionKey;

/// One tracked action and its pin.
///
/// Field names are camelCase on disk. Fields this version does not know
/// about are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub key: ActionKey,

    /// `owner/repo[/subpath]` as the user spelled it. Only written when it
    /// differs from `key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Ref the user asked for; `null` means latest. Required on disk.
    #[serde(deserialize_with = "Option::deserialize")]
    pub requested_ref: Option<String>,

    pub resolved_sha: String,

    /// Tag label of the resolution, empty when none was matched.
    pub resolved_tag: String,

    /// Project-relative, forward slashes.
    pub output_file_path: String,

    pub binding_name: String,

    /// `sha256:<hex>` of the generated file.
    pub content_hash: String,

    pub updated_at: DateTime<Utc>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ManifestEntry {
    /// Current time at the precision stored in the manifest.
    pub fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }

    /// Spelling to fetch and pin with: `source`, else the key.
    pub fn action(&self) -> &str {
        self.source.as_deref().unwrap_or(self.key.as_str())
    }

    /// Whether the pin and the rendered content are the same as `other`'s.
    pub fn same_pin(&self, other: &ManifestEntry) -> bool {
        self.requested_ref == other.requested_ref
            && self.resolved_sha == other.resolved_sha
            && self.resolved_tag == other.resolved_tag
            && self.content_hash == other.content_hash
    }
}
