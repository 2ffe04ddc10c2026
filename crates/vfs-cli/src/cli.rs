//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// vfsck - Check and repair a virtual filesystem index against its content store
#[derive(Parser, Debug)]
#[command(name = "vfsck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true, env = "VFSCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Content store root directory, overrides [store] root
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Index file, overrides [index] path
    #[arg(long, global = true)]
    pub index: Option<PathBuf>,

    /// Abort the run after this many seconds, overrides [fsck] timeout_secs
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Report discrepancies without changing anything
    ///
    /// Exits with status 2 when the index and the store disagree.
    Check {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Report discrepancies and repair the index
    ///
    /// Examples:
    ///   vfsck repair              # Apply the repair policy
    ///   vfsck repair --dry-run    # Show what would be repaired
    Repair {
        /// Describe repairs without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Create a new index file from the current store contents
    InitIndex,
}
