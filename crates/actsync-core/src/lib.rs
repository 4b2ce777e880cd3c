//! Reference resolution and manifest synchronization for actsync
//!
//! This crate turns action references such as `actions/checkout@v4` into
//! immutable commit pins and keeps a set of generated, typed bindings in
//! step with a persistent manifest:
//!
//! - **Version selection**: pure choice of a tag from an action's tag list
//! - **Manifest**: validated, atomically persisted record of tracked actions
//! - **Orchestration**: one add, update, remove or regenerate per action,
//!   with rollback of file writes on failure
//! - **SyncEngine**: lock, load, apply, persist transactions and drift checks
//!
//! # Architecture
//!
//! ```text
//!                     actsync-cli
//!                          |
//!                     SyncEngine
//!                          |
//!                 BindingOrchestrator
//!                          |
//!   +----------+-----------+-----------+------------+
//!   |          |           |           |            |
//! version   Provider   Renderer    Manifest     actsync-fs
//!           (trait)     (trait)     Store
//! ```
//!
//! Providers and renderers are traits so the engine runs the same against
//! a git remote, an in-memory fixture, or any other source.
//!
//! # Example
//!
//! ```
//! use actsync_core::{AddRequest, Config, MemoryProvider, SyncEngine};
//! use actsync_core::metadata::ActionMetadata;
//! use actsync_fs::NormalizedPath;
//!
//! # fn main() -> actsync_core::Result<()> {
//! let sha = "0123456789abcdef0123456789abcdef01234567";
//! let provider = MemoryProvider::new();
//! provider.publish_tag("actions/checkout", "v4", sha);
//! provider.publish_metadata("actions/checkout", sha, ActionMetadata::default());
//!
//! let dir = tempfile::tempdir().unwrap();
//! let engine = SyncEngine::new(NormalizedPath::new(dir.path()), Config::default(), provider);
//!
//! let report = engine.add(vec![AddRequest::parse("actions/checkout")?])?;
//! assert_eq!(report.files_written(), vec!["src/actions/checkout.rs"]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod naming;
pub mod orchestrator;
pub mod provider;
pub mod reference;
pub mod render;
pub mod sync;
pub mod version;

pub use config::Config;
pub use error::{CollisionField, Error, ErrorKind, Result};
pub use manifest::{Manifest, ManifestEntry, ManifestLock, ManifestStore};
pub use metadata::ActionMetadata;
pub use orchestrator::{BindingOrchestrator, Operation, Outcome, OutcomeError, OutcomeStatus};
pub use provider::{FetchError, MemoryProvider, Provider, RefKind, ResolvedRef};
pub use reference::{ActionKey, ActionReference};
pub use render::{BindingRenderer, BindingSource, RenderError, RustRenderer};
pub use sync::{
    AddRequest, DriftItem, DriftReport, DriftStatus, Summary, SyncEngine, SyncOptions, SyncReport,
    UpdateTarget,
};
pub use version::{ResolvedVersion, VersionIntent};
