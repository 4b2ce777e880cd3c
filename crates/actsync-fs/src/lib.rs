//! Filesystem primitives for actsync
//!
//! Provides forward-slash normalized paths, crash-safe staged writes,
//! advisory locks, and the canonical `sha256:<hex>` content hash used for
//! drift detection.

pub mod checksum;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use checksum::{content_hash, file_hash, is_content_hash};
pub use error::{Error, Result};
pub use io::StagedFile;
pub use lock::LockGuard;
pub use path::{NormalizedPath, validate_relative_path};
