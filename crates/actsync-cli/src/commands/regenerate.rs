//! Regenerate command implementation

use std::path::Path;

use colored::Colorize;

use super::Status;
use super::output::print_report;
use crate::context::{GlobalArgs, Project};
use crate::error::Result;

/// Run the regenerate command
///
/// Re-renders every binding at its pinned commit without re-resolving refs.
pub fn run_regenerate(root: Option<&Path>, args: GlobalArgs) -> Result<Status> {
    if !args.json {
        println!("{} Regenerating bindings...", "=>".blue().bold());
    }

    let project = Project::open(root)?;
    let report = project.engine(args)?.regenerate_all()?;
    print_report("regenerate", &report, args)
}
