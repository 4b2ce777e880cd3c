//! Add command implementation

use std::path::Path;

use colored::Colorize;

use actsync_core::AddRequest;

use super::Status;
use super::output::print_report;
use crate::context::{GlobalArgs, Project};
use crate::error::{CliError, Result};

/// Run the add command
///
/// Resolves each reference and writes its binding. A `--name` override only
/// makes sense for a single reference.
pub fn run_add(
    root: Option<&Path>,
    references: &[String],
    name: Option<&str>,
    args: GlobalArgs,
) -> Result<Status> {
    if name.is_some() && references.len() > 1 {
        return Err(CliError::user("--name can only be used with a single reference"));
    }

    let requests = references
        .iter()
        .map(|reference| -> Result<AddRequest> {
            let request = AddRequest::parse(reference)?;
            Ok(match name {
                Some(name) => request.with_binding_name(name),
                None => request,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if !args.json {
        println!(
            "{} Adding {} reference{}...",
            "=>".blue().bold(),
            requests.len(),
            if requests.len() == 1 { "" } else { "s" }
        );
    }

    let project = Project::open(root)?;
    let report = project.engine(args)?.add(requests)?;
    print_report("add", &report, args)
}
