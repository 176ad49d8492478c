//! svnreplay core library: domain types, config and identity mapping.
//!
//! Public API surface:
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`ConfigError`], [`VcsError`]
//! - [`config`]: load / save / init of the YAML config
//! - [`identity`]: committer → identity resolution
//! - [`provider`]: source and destination collaborator traits

pub mod config;
pub mod error;
pub mod identity;
pub mod provider;
pub mod types;

pub use config::{ReplayConfig, ReplaySettings};
pub use error::{ConfigError, VcsError};
pub use provider::{DestinationRepository, SourceRevisionProvider};
pub use types::{CommitInfo, Identity, ProjectName, RevisionNumber, WorkingCopy};
