//! Git destination repository backed by the `git` command-line client.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, FixedOffset};

use svnreplay_core::{DestinationRepository, Identity, VcsError};

use crate::command::run_for_stdout;

/// Name git records when the source commit had no author.
pub const ANONYMOUS_AUTHOR: &str = "(no author)";

/// Git repository rooted at a workspace folder.
#[derive(Debug, Clone)]
pub struct GitRepository {
    root: PathBuf,
}

impl GitRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.root);
        cmd
    }
}

/// `"<unix seconds> <+hhmm>"`, git's internal date format.
pub fn git_date(at: DateTime<FixedOffset>) -> String {
    format!("{} {}", at.timestamp(), at.format("%z"))
}

impl DestinationRepository for GitRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self) -> bool {
        self.root.is_dir()
    }

    fn init(&mut self) -> Result<(), VcsError> {
        tracing::info!(path = %self.root.display(), "git init");
        run_for_stdout(self.git().args(["init", "--quiet"]))?;
        // Byte-for-byte replay: never rewrite line endings on add.
        run_for_stdout(self.git().args(["config", "core.autocrlf", "false"]))?;
        Ok(())
    }

    fn commit_all(
        &mut self,
        message: &str,
        identity: &Identity,
        authored_at: DateTime<FixedOffset>,
    ) -> Result<(), VcsError> {
        // Every reconciled file is versioned upstream; ignore rules must not drop any.
        run_for_stdout(self.git().args(["add", "--all", "--force", "."]))?;

        let name = if identity.name.is_empty() {
            ANONYMOUS_AUTHOR
        } else {
            identity.name.as_str()
        };
        let date = git_date(authored_at);
        run_for_stdout(
            self.git()
                .args([
                    "commit",
                    "--quiet",
                    "--allow-empty",
                    "--allow-empty-message",
                    "--no-verify",
                    "--no-gpg-sign",
                    "--cleanup=verbatim",
                    "-m",
                    message,
                ])
                .env("GIT_AUTHOR_NAME", name)
                .env("GIT_AUTHOR_EMAIL", &identity.email)
                .env("GIT_AUTHOR_DATE", &date)
                .env("GIT_COMMITTER_NAME", name)
                .env("GIT_COMMITTER_EMAIL", &identity.email)
                .env("GIT_COMMITTER_DATE", &date),
        )?;
        tracing::debug!(%name, email = %identity.email, %date, "committed");
        Ok(())
    }
}
