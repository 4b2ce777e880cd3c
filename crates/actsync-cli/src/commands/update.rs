//! Update command implementation

use std::path::Path;

use colored::Colorize;

use actsync_core::UpdateTarget;

use super::output::print_report;
use super::{Status, tracked_key};
use crate::context::{GlobalArgs, Project};
use crate::error::Result;

/// Run the update command for one reference, or all when `reference` is
/// `None`.
pub fn run_update(root: Option<&Path>, reference: Option<&str>, args: GlobalArgs) -> Result<Status> {
    let target = match reference {
        Some(reference) => UpdateTarget::One(tracked_key(reference, false)?),
        None => UpdateTarget::All,
    };

    if !args.json {
        let what = match &target {
            UpdateTarget::One(key) => key.as_str().cyan().to_string(),
            UpdateTarget::All => "all tracked actions".to_string(),
        };
        println!("{} Updating {what}...", "=>".blue().bold());
    }

    let project = Project::open(root)?;
    let report = project.engine(args)?.update(target)?;
    print_report("update", &report, args)
}
