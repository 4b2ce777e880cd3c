//! SyncEngine for keeping generated bindings in step with the manifest
//!
//! This module provides:
//! - **engine**: transactional `add`, `remove`, `update` and `regenerate_all`
//! - **check**: drift detection between recorded hashes and files on disk
//! - **report**: per-reference outcomes and summaries

mod check;
mod engine;
mod report;

pub use check::{DriftItem, DriftReport, DriftStatus};
pub use engine::{AddRequest, SyncEngine, SyncOptions, UpdateTarget};
pub use report::{Summary, SyncReport};
