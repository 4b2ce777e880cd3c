//! git2-backed source provider for actsync
//!
//! [`GitProvider`] keeps a bare mirror of every action repository it is asked
//! about and answers [`actsync_core::Provider`] queries from it. Fetches go
//! through [`RetryPolicy`] so that flaky networks do not fail a whole sync.

mod cache;
pub mod error;
pub mod provider;
pub mod retry;

pub use error::{Error, Result};
pub use provider::GitProvider;
pub use retry::RetryPolicy;
