//! Revision replication pipeline.
//!
//! ```text
//! Uninitialized → WorkspaceReady → RepoInitialized → Replaying(1) → … → Replaying(N) → Completed
//!        └──────────────┴──────────────────┴──────────────┴──────────────────┴──→ Aborted
//! ```
//!
//! Revision 1 is checked out; 2..N update the same working copy in place.
//! Each revision is reconciled into the destination tree and committed with
//! the source author, message, and timestamp before the next one starts.
//! On abort the destination keeps revisions 1..r-1; revision r is never
//! committed because the commit only follows a successful reconcile.

use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset};

use svnreplay_core::{
    identity, DestinationRepository, ReplaySettings, RevisionNumber, SourceRevisionProvider,
    WorkingCopy,
};

use crate::error::ReplayError;
use crate::reconcile;
use crate::workspace::Workspace;

/// Metadata directory of a Subversion working copy; never copied.
pub const SOURCE_METADATA_DIR: &str = ".svn";
/// Metadata directory of the Git destination; never touched by reconcile.
pub const DESTINATION_METADATA_DIR: &str = ".git";

const EXCLUDE: &[&str] = &[SOURCE_METADATA_DIR, DESTINATION_METADATA_DIR];

/// Where the pipeline is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    WorkspaceReady,
    RepoInitialized,
    Replaying(RevisionNumber),
    Completed,
    Aborted,
}

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    Completed,
    /// `revision` is the revision being replayed when the error hit, or
    /// `None` if the run failed before replaying started.
    Aborted {
        revision: Option<RevisionNumber>,
        error: ReplayError,
    },
}

/// Summary returned by [`Pipeline::run`].
#[derive(Debug)]
pub struct PipelineReport {
    pub outcome: Outcome,
    /// Revisions committed to the destination, in order.
    pub committed: Vec<RevisionNumber>,
    /// Last revision the run intended to replay, once known.
    pub upper_bound: Option<u64>,
    pub elapsed: Duration,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Completed)
    }
}

/// Effective last revision: `max_revision`, capped by a non-zero `limit`.
pub fn upper_bound(max_revision: u64, limit: u64) -> u64 {
    if limit == 0 {
        max_revision
    } else {
        max_revision.min(limit)
    }
}

/// Drives one source → destination replay. Single use.
pub struct Pipeline<S, D> {
    settings: ReplaySettings,
    workspace: Workspace,
    source: S,
    destination: D,
    state: PipelineState,
    /// Set before checkout starts, so a partial working copy is cleaned too.
    working_copy: Option<String>,
    committed: Vec<RevisionNumber>,
    upper_bound: Option<u64>,
    last_timestamp: Option<DateTime<FixedOffset>>,
}

impl<S, D> Pipeline<S, D>
where
    S: SourceRevisionProvider,
    D: DestinationRepository,
{
    pub fn new(settings: ReplaySettings, workspace: Workspace, source: S, destination: D) -> Self {
        Self {
            settings,
            workspace,
            source,
            destination,
            state: PipelineState::Uninitialized,
            working_copy: None,
            committed: Vec::new(),
            upper_bound: None,
            last_timestamp: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    /// Replay every revision in range. Never returns an error: failures end
    /// in [`Outcome::Aborted`] with the partial history left committed.
    pub fn run(&mut self) -> PipelineReport {
        let started = Instant::now();

        let outcome = if self.state != PipelineState::Uninitialized {
            Outcome::Aborted {
                revision: None,
                error: ReplayError::AlreadyRan,
            }
        } else {
            match self.try_run() {
                Ok(()) => Outcome::Completed,
                Err(error) => {
                    let revision = match self.state {
                        PipelineState::Replaying(r) => Some(r),
                        _ => None,
                    };
                    match revision {
                        Some(r) => tracing::error!(revision = r.0, "replay aborted: {error}"),
                        None => tracing::error!(state = ?self.state, "replay aborted: {error}"),
                    }
                    self.transition(PipelineState::Aborted);
                    self.remove_working_copy();
                    Outcome::Aborted { revision, error }
                }
            }
        };

        PipelineReport {
            outcome,
            committed: self.committed.clone(),
            upper_bound: self.upper_bound,
            elapsed: started.elapsed(),
        }
    }

    fn try_run(&mut self) -> Result<(), ReplayError> {
        self.workspace.create("")?;
        self.transition(PipelineState::WorkspaceReady);

        let project = self.settings.project.0.clone();
        let working_copy_name = self.source.working_copy_name();
        if project == working_copy_name {
            return Err(ReplayError::ProjectIsWorkingCopy { name: project });
        }
        if self.destination.exists() || self.workspace.exists(&project) {
            return Err(ReplayError::DestinationExists {
                path: self.destination.root().to_path_buf(),
            });
        }
        self.workspace.create(&project)?;
        self.destination.init().map_err(ReplayError::Destination)?;
        self.transition(PipelineState::RepoInitialized);

        let max_revision = self.source.max_revision().map_err(ReplayError::Source)?;
        let upper = upper_bound(max_revision, self.settings.revision_limit);
        self.upper_bound = Some(upper);
        tracing::info!(max_revision, upper_bound = upper, "replay range");
        if upper == 0 {
            tracing::warn!("source repository has no revisions; nothing to replay");
            self.transition(PipelineState::Completed);
            return Ok(());
        }

        let mut revision = RevisionNumber::FIRST;
        self.transition(PipelineState::Replaying(revision));
        if self.workspace.exists(&working_copy_name) {
            tracing::warn!(name = %working_copy_name, "removing working copy left by an earlier run");
            self.workspace.delete(&working_copy_name)?;
        }
        self.working_copy = Some(working_copy_name);
        let working_copy = self.source.checkout_at(revision).map_err(ReplayError::Source)?;
        if self.working_copy.as_deref() != Some(working_copy.name.as_str()) {
            tracing::warn!(
                expected = ?self.working_copy,
                actual = %working_copy.name,
                "checkout used an unexpected folder name"
            );
            self.working_copy = Some(working_copy.name.clone());
        }

        loop {
            tracing::info!("working on revision [{revision}/{upper}]");
            self.replay_revision(&working_copy, revision)?;
            if revision.0 >= upper {
                break;
            }
            revision = revision.next();
            self.transition(PipelineState::Replaying(revision));
            self.source
                .update_to(&working_copy, revision)
                .map_err(ReplayError::Source)?;
        }

        self.remove_working_copy();
        self.transition(PipelineState::Completed);
        Ok(())
    }

    fn replay_revision(
        &mut self,
        working_copy: &WorkingCopy,
        revision: RevisionNumber,
    ) -> Result<(), ReplayError> {
        let info = self
            .source
            .commit_info(working_copy, revision)
            .map_err(ReplayError::Source)?;
        if let Some(previous) = self.last_timestamp {
            if info.timestamp <= previous {
                tracing::warn!(
                    revision = revision.0,
                    "timestamp {} is not after the previous revision's {}",
                    info.timestamp.to_rfc3339(),
                    previous.to_rfc3339()
                );
            }
        }

        let plan = reconcile::reconcile(&working_copy.path, self.destination.root(), EXCLUDE)?;

        let identity = identity::resolve(&info.author, &self.settings.usermap);
        let message = info.commit_message(self.settings.prefix_revision);
        self.destination
            .commit_all(&message, &identity, info.timestamp)
            .map_err(ReplayError::Destination)?;

        self.committed.push(revision);
        self.last_timestamp = Some(info.timestamp);
        tracing::info!(
            revision = revision.0,
            copied = plan.copies(),
            removed = plan.removals(),
            author = %identity.name,
            "committed"
        );
        Ok(())
    }

    /// Best-effort: a leftover working copy is logged, never fatal.
    fn remove_working_copy(&mut self) {
        if let Some(name) = self.working_copy.take() {
            if let Err(e) = self.workspace.delete(&name) {
                let path = self.workspace.folder(&name);
                tracing::warn!("could not remove working copy {}: {e}", path.display());
            }
        }
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!(from = ?self.state, to = ?next, "pipeline state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_is_unlimited() {
        assert_eq!(upper_bound(10, 0), 10);
    }

    #[test]
    fn limit_caps_range() {
        assert_eq!(upper_bound(10, 3), 3);
    }

    #[test]
    fn limit_above_max_is_max() {
        assert_eq!(upper_bound(10, 50), 10);
    }

    #[test]
    fn empty_repository_has_empty_range() {
        assert_eq!(upper_bound(0, 0), 0);
        assert_eq!(upper_bound(0, 5), 0);
    }

    #[test]
    fn excluded_names_cover_both_metadata_dirs() {
        assert!(EXCLUDE.contains(&".svn"));
        assert!(EXCLUDE.contains(&".git"));
    }
}
