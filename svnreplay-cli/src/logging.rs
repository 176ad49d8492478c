//! Subscriber setup for `svnreplay run`.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use svnreplay_core::config::LoggingSection;

/// `RUST_LOG` wins; otherwise `logging.loglevel`. With `logging.logfile` set
/// (relative to `config_dir`) the file is truncated and receives all output.
pub fn init(logging: &LoggingSection, config_dir: &Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level_directive(&logging.loglevel)))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(false);

    match &logging.logfile {
        Some(file) => {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                config_dir.join(file)
            };
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("cannot create log directory '{}'", dir.display()))?;
            }
            let file = File::create(&path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
    Ok(())
}

/// Also accepts `warning` and `critical` as level names.
fn level_directive(loglevel: &str) -> String {
    match loglevel.trim().to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        "" => "info".to_string(),
        other => other.to_string(),
    }
}
