//! Human and JSON rendering of engine reports

use colored::{ColoredString, Colorize};
use serde::Serialize;

use actsync_core::{Outcome, OutcomeStatus, Summary, SyncReport};

use super::Status;
use crate::context::GlobalArgs;
use crate::error::Result;

#[derive(Serialize)]
struct JsonReport<'a> {
    command: &'a str,
    #[serde(flatten)]
    report: &'a SyncReport,
    summary: Summary,
}

/// Print `report` and derive the exit status from its failures.
pub fn print_report(command: &str, report: &SyncReport, args: GlobalArgs) -> Result<Status> {
    let status = Status::from_success(!report.has_failures());

    if args.json {
        let json = JsonReport {
            command,
            report,
            summary: report.summary(),
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(status);
    }

    for outcome in &report.outcomes {
        print_outcome(outcome);
    }

    let summary = report.summary();
    let suffix = if report.dry_run { " (dry run)" } else { "" };
    match status {
        Status::Success => println!("{} {summary}{suffix}", "OK".green().bold()),
        Status::Failure => println!("{} {summary}{suffix}", "FAILED".red().bold()),
    }
    Ok(status)
}

fn print_outcome(outcome: &Outcome) {
    let label = format!("{:<9}", outcome.status.as_str());
    print!("   {} {}", paint(outcome.status, label), outcome.key.as_str().cyan());

    if let Some(error) = &outcome.error {
        println!(": {}", error.message);
        return;
    }
    if let Some(tag) = outcome.tag.as_deref().filter(|t| !t.is_empty()) {
        print!(" {tag}");
    }
    if let Some(sha) = &outcome.sha {
        print!(" {}", short_sha(sha).dimmed());
    }
    if let Some(file) = &outcome.file {
        let marker = if outcome.file_written { "->" } else { "  " };
        print!(" {marker} {file}");
    }
    println!();
}

fn paint(status: OutcomeStatus, label: String) -> ColoredString {
    match status {
        OutcomeStatus::Created => label.green(),
        OutcomeStatus::Updated => label.cyan(),
        OutcomeStatus::Unchanged => label.dimmed(),
        OutcomeStatus::Removed | OutcomeStatus::NotFound => label.yellow(),
        OutcomeStatus::Failed => label.red().bold(),
    }
}

pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
