//! List command implementation

use std::path::Path;

use colored::Colorize;

use super::Status;
use super::output::short_sha;
use crate::context::{GlobalArgs, Project};
use crate::error::Result;

/// Run the list command
///
/// Prints every manifest entry. JSON mode prints the entries exactly as
/// stored.
pub fn run_list(root: Option<&Path>, args: GlobalArgs) -> Result<Status> {
    let project = Project::open(root)?;
    let manifest = project.engine(args)?.manifest()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(manifest.entries())?);
        return Ok(Status::Success);
    }

    if manifest.is_empty() {
        println!("No actions tracked. Run {} to add one.", "actsync add".cyan());
        return Ok(Status::Success);
    }

    println!("{}", "Tracked actions:".bold());
    for entry in manifest.entries() {
        let requested = entry.requested_ref.as_deref().unwrap_or("latest");
        let tag = if entry.resolved_tag.is_empty() {
            String::new()
        } else {
            format!(" ({})", entry.resolved_tag)
        };
        println!(
            "   {} @{requested}{tag} {} {} {}",
            entry.action().cyan(),
            short_sha(&entry.resolved_sha).dimmed(),
            entry.binding_name.bold(),
            entry.output_file_path
        );
    }
    Ok(Status::Success)
}
