//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// actsync - Keep typed CI action bindings in sync with their upstream tags
#[derive(Parser, Debug)]
#[command(name = "actsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long = "root", global = true, env = "ACTSYNC_ROOT")]
    pub root: Option<PathBuf>,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Show what would change without writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Track actions and generate their bindings
    ///
    /// Examples:
    ///   actsync add actions/checkout@v4
    ///   actsync add actions/setup-node github/codeql-action/init@v3
    ///   actsync add acme/deploy --name DeployProd
    Add {
        /// References as owner/repo[/subpath][@ref]
        #[arg(required = true)]
        references: Vec<String>,

        /// Binding name override (single reference only)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Stop tracking an action
    Remove {
        /// Reference as owner/repo[/subpath]
        reference: String,

        /// Leave the generated file on disk
        #[arg(long)]
        keep_file: bool,
    },

    /// Re-resolve tracked actions against upstream tags
    Update {
        /// Reference as owner/repo[/subpath]
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        reference: Option<String>,

        /// Update every tracked action
        #[arg(long)]
        all: bool,
    },

    /// Re-render every binding at its pinned commit
    Regenerate,

    /// List tracked actions
    List,

    /// Compare generated files with their recorded hashes
    Check,
}
