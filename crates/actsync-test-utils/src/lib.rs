//! Shared test utilities for the actsync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: local git remotes laid out like action repositories
//! - [`project`]: [`project::TestProject`], a consumer project wired to those remotes

pub mod git;
pub mod project;
