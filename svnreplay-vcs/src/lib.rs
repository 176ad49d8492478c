//! # svnreplay-vcs
//!
//! Command-line clients for both ends of a replay:
//! [`SvnClient`] implements [`SourceRevisionProvider`] and
//! [`GitRepository`] implements [`DestinationRepository`].
//!
//! [`SourceRevisionProvider`]: svnreplay_core::SourceRevisionProvider
//! [`DestinationRepository`]: svnreplay_core::DestinationRepository

mod command;
pub mod git;
pub mod svn;

pub use git::GitRepository;
pub use svn::{repository_name_from_url, SvnClient};
