//! `svnreplay init [--config <path>] [--force]`

use anyhow::{Context, Result};
use clap::Args;

use svnreplay_core::config;

use super::ConfigArg;

/// Write a placeholder config file.
#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Overwrite an existing config with placeholders.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let path = self.config.path();
        let (_, written) = config::init_at(&path, self.force)
            .with_context(|| format!("failed to init config at '{}'", path.display()))?;

        if written {
            println!("✓ Wrote config to {}", path.display());
            println!("  Set git.project, svn.repository_url and svn.usermap, then run 'svnreplay run'.");
        } else {
            println!("Config already exists at {} (use --force to overwrite)", path.display());
        }
        Ok(())
    }
}
