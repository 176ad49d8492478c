//! # svnreplay-sync
//!
//! Workspace management, two-phase tree reconciliation, and the revision
//! replication pipeline.
//!
//! Build a [`Pipeline`] from the config's [`ReplaySettings`], a
//! [`Workspace`], and the source/destination clients, then call
//! [`Pipeline::run`].
//!
//! [`ReplaySettings`]: svnreplay_core::ReplaySettings

pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod workspace;

pub use error::ReplayError;
pub use pipeline::{Outcome, Pipeline, PipelineReport, PipelineState};
pub use reconcile::{reconcile, ReconcilePlan, SyncAction};
pub use workspace::Workspace;
