//! Error types for svnreplay-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading or saving the replay config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// A value is missing, still a placeholder, or otherwise unusable.
    #[error("invalid config value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Errors raised by the source and destination repository clients.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The external tool could not be started at all.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool exited with a non-zero status.
    #[error("'{program} {args}' failed ({status}): {stderr}")]
    CommandFailed {
        program: String,
        args: String,
        status: String,
        stderr: String,
    },

    /// Tool output could not be parsed.
    #[error("cannot parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    /// A log query must yield exactly one entry for the requested revision.
    #[error("expected exactly one log entry for revision {revision}, found {found}")]
    LogEntryCount { revision: u64, found: usize },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by a non-process backend.
    #[error("{0}")]
    Other(String),
}

pub(crate) fn config_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
