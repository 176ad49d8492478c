//! Error types for svnreplay-sync.

use std::path::PathBuf;

use thiserror::Error;

use svnreplay_core::VcsError;

/// All errors that can abort a replay run.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The workspace base or a folder inside it could not be created.
    #[error("cannot create workspace folder {path}: {source}")]
    WorkspaceUncreatable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination folder is left over from an earlier run.
    #[error("destination repository already exists at {path}; remove it or pick another git.project")]
    DestinationExists { path: PathBuf },

    /// `git.project` names the folder the source working copy uses.
    #[error("git.project '{name}' is the working copy folder name; pick another project name")]
    ProjectIsWorkingCopy { name: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed while scanning a tree.
    #[error("cannot scan {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("source repository: {0}")]
    Source(#[source] VcsError),

    #[error("destination repository: {0}")]
    Destination(#[source] VcsError),

    /// `Pipeline::run` was called on a pipeline that already ran.
    #[error("pipeline already ran")]
    AlreadyRan,
}

/// Convenience constructor for [`ReplayError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ReplayError {
    ReplayError::Io {
        path: path.into(),
        source,
    }
}
