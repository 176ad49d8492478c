//! Domain types for a replay run.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A Subversion revision number. Revisions replayed by the pipeline are
/// always `>= 1`; revision 0 is the empty repository root and never replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RevisionNumber(pub u64);

impl RevisionNumber {
    pub const FIRST: RevisionNumber = RevisionNumber(1);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RevisionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for RevisionNumber {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

/// Name of the destination project folder inside the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectName(pub String);

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Metadata of exactly one source revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub author: String,
    /// Raw log message; may be empty.
    pub message: String,
    pub timestamp: DateTime<FixedOffset>,
    pub revision: RevisionNumber,
}

impl CommitInfo {
    /// Message for the destination commit.
    ///
    /// With `prefix_revision`, the message becomes `"#<rev>: <message>"`.
    pub fn commit_message(&self, prefix_revision: bool) -> String {
        if !prefix_revision {
            return self.message.clone();
        }
        if self.message.is_empty() {
            format!("#{}:", self.revision)
        } else {
            format!("#{}: {}", self.revision, self.message)
        }
    }
}

impl fmt::Display for CommitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "r{} by '{}' at {} ({} byte message)",
            self.revision,
            self.author,
            self.timestamp.to_rfc3339(),
            self.message.len()
        )
    }
}

/// Destination-side author identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// The single materialized source tree, named relative to the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    /// Folder name inside the workspace base (e.g. `svn_myrepo`).
    pub name: String,
    /// Absolute path of the folder.
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
