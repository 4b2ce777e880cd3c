//! actsync CLI
//!
//! Tracks third-party CI actions and keeps their generated bindings pinned
//! and up to date.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::Status;
use context::GlobalArgs;
use error::Result;

fn main() {
    match run() {
        Ok(Status::Success) => {}
        Ok(Status::Failure) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<Status> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let args = GlobalArgs {
        json: cli.json,
        dry_run: cli.dry_run,
    };
    let root = cli.root.as_deref();

    match cli.command {
        Commands::Add { references, name } => {
            commands::run_add(root, &references, name.as_deref(), args)
        }
        Commands::Remove {
            reference,
            keep_file,
        } => commands::run_remove(root, &reference, keep_file, args),
        Commands::Update { reference, .. } => {
            commands::run_update(root, reference.as_deref(), args)
        }
        Commands::Regenerate => commands::run_regenerate(root, args),
        Commands::List => commands::run_list(root, args),
        Commands::Check => commands::run_check(root, args),
    }
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flag.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}
