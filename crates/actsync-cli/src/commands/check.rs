//! Check command implementation

use std::path::Path;

use colored::Colorize;

use actsync_core::DriftStatus;

use super::Status;
use crate::context::{GlobalArgs, Project};
use crate::error::Result;

/// Run the check command
///
/// Exits non-zero when any generated file is modified or missing.
pub fn run_check(root: Option<&Path>, args: GlobalArgs) -> Result<Status> {
    let project = Project::open(root)?;
    let report = project.engine(args)?.check()?;
    let status = Status::from_success(report.is_clean());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(status);
    }

    println!("{} Checking generated bindings...", "=>".blue().bold());
    if report.is_clean() {
        println!(
            "{} {} binding(s) match the manifest.",
            "OK".green().bold(),
            report.items.len()
        );
        return Ok(status);
    }

    for item in report.drifted() {
        let label = match item.status {
            DriftStatus::Modified => "MODIFIED".red().bold(),
            DriftStatus::Missing => "MISSING".yellow().bold(),
            DriftStatus::Clean => continue,
        };
        println!("   {label} {} ({})", item.file, item.key.as_str().dimmed());
    }
    println!();
    println!("Run {} to restore them.", "actsync regenerate".cyan());
    Ok(status)
}
