//! Collaborator contracts driven by the revision pipeline.
//!
//! The pipeline is generic over these traits; `svnreplay-vcs` provides the
//! command-line implementations and tests substitute scripted fakes.

use std::path::Path;

use chrono::{DateTime, FixedOffset};

use crate::error::VcsError;
use crate::types::{CommitInfo, Identity, RevisionNumber, WorkingCopy};

/// Read side: the centralized repository being replayed.
pub trait SourceRevisionProvider {
    /// Highest revision in the repository; `0` for an empty repository.
    fn max_revision(&self) -> Result<u64, VcsError>;

    /// Workspace folder [`checkout_at`](Self::checkout_at) materializes into.
    /// Known up front so a half-finished checkout can still be removed.
    fn working_copy_name(&self) -> String;

    /// Materialize `revision` into a fresh working copy named
    /// [`working_copy_name`](Self::working_copy_name).
    fn checkout_at(&mut self, revision: RevisionNumber) -> Result<WorkingCopy, VcsError>;

    /// Advance an existing working copy in place.
    fn update_to(
        &mut self,
        working_copy: &WorkingCopy,
        revision: RevisionNumber,
    ) -> Result<(), VcsError>;

    /// Metadata of exactly one revision. Implementations must fail rather than
    /// return a guess when the log does not hold exactly one matching entry.
    fn commit_info(
        &self,
        working_copy: &WorkingCopy,
        revision: RevisionNumber,
    ) -> Result<CommitInfo, VcsError>;
}

/// Write side: the distributed repository receiving one commit per revision.
pub trait DestinationRepository {
    /// Working tree root the reconciler writes into.
    fn root(&self) -> &Path;

    fn exists(&self) -> bool;

    /// Initialize an empty repository in [`root`](Self::root).
    fn init(&mut self) -> Result<(), VcsError>;

    /// Stage every change (including deletions) and commit it, using
    /// `authored_at` for both the author and committer dates.
    fn commit_all(
        &mut self,
        message: &str,
        identity: &Identity,
        authored_at: DateTime<FixedOffset>,
    ) -> Result<(), VcsError>;
}
