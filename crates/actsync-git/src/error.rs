//! Error types for actsync-git

/// Result type for actsync-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in actsync-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] actsync_fs::Error),

    #[error("No cache directory available; set provider.cache_dir in actsync.toml")]
    NoCacheDir,

    #[error("Invalid commit sha '{sha}'")]
    InvalidSha { sha: String },

    #[error("No action.yml or action.yaml in '{dir}'")]
    MetadataNotFound { dir: String },

    #[error("{path} is not valid UTF-8")]
    NotUtf8 { path: String },

    #[error(transparent)]
    Metadata(#[from] actsync_core::metadata::MetadataError),
}
