//! Error types for actsync-core

use std::path::PathBuf;

use serde::Serialize;

use crate::provider::FetchError;

/// Result type for actsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which manifest field a collision was detected on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionField {
    BindingName,
    OutputPath,
}

impl std::fmt::Display for CollisionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BindingName => f.write_str("binding name"),
            Self::OutputPath => f.write_str("output path"),
        }
    }
}

/// Errors that can occur in actsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A reference could not be parsed or resolved to a commit
    #[error("Cannot resolve '{reference}': {reason}")]
    Resolution { reference: String, reason: String },

    /// The source repository provider failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Another tracked action already owns this binding name or output path
    #[error("{field} '{value}' is already used by {existing}")]
    NameCollision {
        field: CollisionField,
        value: String,
        existing: String,
    },

    /// A binding name override is not a valid type name
    #[error("Invalid binding name '{name}': expected an UpperCamelCase identifier")]
    InvalidBindingName { name: String },

    /// An untracked file already exists where a binding would be written
    #[error("Refusing to overwrite untracked file {path}")]
    FileConflict { path: String },

    /// The action is not present in the manifest
    #[error("Action '{key}' is not tracked in the manifest")]
    NotTracked { key: String },

    /// The renderer could not produce a binding
    #[error("Failed to render binding for {key}: {reason}")]
    Render { key: String, reason: String },

    /// The on-disk manifest failed schema validation
    #[error("Manifest at {path} is corrupt: {reason}")]
    ManifestCorrupt { path: PathBuf, reason: String },

    /// Another process holds the manifest lock
    #[error("Manifest at {path} is locked by another actsync process")]
    ManifestLocked { path: PathBuf },

    /// The project configuration is invalid
    #[error("Invalid configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Filesystem error from actsync-fs
    #[error(transparent)]
    Fs(#[from] actsync_fs::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Coarse error category surfaced in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Resolution,
    Fetch,
    NameCollision,
    InvalidBindingName,
    FileConflict,
    NotTracked,
    Render,
    ManifestCorrupt,
    ManifestLocked,
    Config,
    Io,
}

impl Error {
    pub fn resolution(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolution { .. } => ErrorKind::Resolution,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::NameCollision { .. } => ErrorKind::NameCollision,
            Self::InvalidBindingName { .. } => ErrorKind::InvalidBindingName,
            Self::FileConflict { .. } => ErrorKind::FileConflict,
            Self::NotTracked { .. } => ErrorKind::NotTracked,
            Self::Render { .. } => ErrorKind::Render,
            Self::ManifestCorrupt { .. } => ErrorKind::ManifestCorrupt,
            Self::ManifestLocked { .. } => ErrorKind::ManifestLocked,
            Self::Config { .. } => ErrorKind::Config,
            Self::Fs(_) | Self::Json(_) => ErrorKind::Io,
        }
    }
}
