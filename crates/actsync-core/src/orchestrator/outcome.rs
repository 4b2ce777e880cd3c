//! Per-reference operation outcomes

use serde::Serialize;

use crate::error::{Error, ErrorKind};
use crate::manifest::ManifestEntry;
use crate::reference::ActionKey;

/// What happened to one reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Created,
    Updated,
    Unchanged,
    Removed,
    NotFound,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Removed => "removed",
            Self::NotFound => "not_found",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error details carried by a failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for OutcomeError {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Result of applying one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub key: ActionKey,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// True when the generated file was written or deleted.
    pub file_written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

impl Outcome {
    /// Outcome describing `entry` after the operation.
    pub fn for_entry(entry: &ManifestEntry, status: OutcomeStatus, file_written: bool) -> Self {
        Self {
            key: entry.key.clone(),
            status,
            sha: Some(entry.resolved_sha.clone()),
            tag: (!entry.resolved_tag.is_empty()).then(|| entry.resolved_tag.clone()),
            file: Some(entry.output_file_path.clone()),
            file_written,
            error: None,
        }
    }

    pub fn not_found(key: &ActionKey) -> Self {
        Self {
            key: key.clone(),
            status: OutcomeStatus::NotFound,
            sha: None,
            tag: None,
            file: None,
            file_written: false,
            error: None,
        }
    }

    pub fn failed(key: &ActionKey, error: &Error) -> Self {
        Self {
            key: key.clone(),
            status: OutcomeStatus::Failed,
            sha: None,
            tag: None,
            file: None,
            file_written: false,
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == OutcomeStatus::Failed
    }
}
