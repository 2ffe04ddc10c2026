//! vfsck CLI
//!
//! Checks a metadata index against its content store and repairs the index.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use commands::{EXIT_FAILURE, EXIT_OK};
use context::RunContext;
use error::Result;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command.clone() else {
        println!("{} Virtual filesystem checker", "vfsck".green().bold());
        println!();
        println!("Run {} for available commands.", "vfsck --help".cyan());
        return Ok(EXIT_OK);
    };

    let cwd = std::env::current_dir()
        .map_err(|e| error::CliError::user(format!("Cannot read working directory: {e}")))?;
    let ctx = RunContext::resolve(&cli, &cwd)?;

    match command {
        Commands::Check { json } => commands::run_check(&ctx, json),
        Commands::Repair { dry_run, json } => commands::run_repair(&ctx, dry_run, json),
        Commands::InitIndex => commands::run_init_index(&ctx),
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else if let Ok(filter) = EnvFilter::try_from_default_env() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        return;
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    } else {
        tracing::debug!("Tracing enabled");
    }
}
