//! svnreplay: replay a Subversion history into a fresh Git repository.
//!
//! # Usage
//!
//! ```text
//! svnreplay init [--config <path>] [--force]
//! svnreplay info [--config <path>] [--json]
//! svnreplay run  [--config <path>] [--limit <n>] [--no-rev-prefix]
//! ```

mod commands;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{info::InfoArgs, init::InitArgs, run::RunArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "svnreplay",
    version,
    about = "Replay every Subversion revision as a Git commit",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a placeholder config file.
    Init(InitArgs),

    /// Show the source repository and the replay range without changing anything.
    Info(InfoArgs),

    /// Replay the source history into a new Git repository.
    Run(RunArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Info(args) => args.run(),
        Commands::Run(args) => args.run(),
    }
}
