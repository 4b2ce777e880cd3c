//! Remove command implementation

use std::path::Path;

use colored::Colorize;

use super::output::print_report;
use super::{Status, tracked_key};
use crate::context::{GlobalArgs, Project};
use crate::error::Result;

/// Run the remove command
///
/// An untracked reference reports `not_found` and still exits 0.
pub fn run_remove(
    root: Option<&Path>,
    reference: &str,
    keep_file: bool,
    args: GlobalArgs,
) -> Result<Status> {
    let key = tracked_key(reference, true)?;

    if !args.json {
        println!("{} Removing {}...", "=>".blue().bold(), key.as_str().cyan());
    }

    let project = Project::open(root)?;
    let report = project.engine(args)?.remove(&key, keep_file)?;
    print_report("remove", &report, args)
}
