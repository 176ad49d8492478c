pub mod info;
pub mod init;
pub mod run;

use std::path::{Path, PathBuf};

use clap::Args;

use svnreplay_core::config;

/// `--config` shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConfigArg {
    /// Config file. Defaults to ./svnreplay.yaml, then the per-user config.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ConfigArg {
    pub fn path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::default_path)
    }
}

/// Directory relative config values resolve against.
pub fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
