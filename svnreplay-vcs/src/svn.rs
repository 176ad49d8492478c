//! Subversion source provider backed by the `svn` command-line client.
//!
//! | Operation      | Command                                              |
//! |----------------|------------------------------------------------------|
//! | max revision   | `svn info --xml <url>` (`entry@revision`)            |
//! | checkout       | `svn checkout -r <rev> <url> <workspace>/svn_<name>` |
//! | update         | `svn update -r <rev> <wc>`                           |
//! | commit info    | `svn log -r <rev>:<rev> --xml ^/` (cwd = wc)         |
//!
//! Every call passes `--non-interactive --no-auth-cache` and the configured
//! credentials, if any.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::DateTime;
use serde::Deserialize;

use svnreplay_core::{
    config::SvnSection, CommitInfo, RevisionNumber, SourceRevisionProvider, VcsError, WorkingCopy,
};

use crate::command::run_for_stdout;

// ---------------------------------------------------------------------------
// XML shapes (only the fields we read)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct InfoXml {
    entry: InfoEntryXml,
}

#[derive(Debug, Deserialize)]
struct InfoEntryXml {
    #[serde(rename = "@revision")]
    revision: u64,
}

#[derive(Debug, Deserialize)]
struct LogXml {
    #[serde(rename = "logentry", default)]
    entries: Vec<LogEntryXml>,
}

#[derive(Debug, Deserialize)]
struct LogEntryXml {
    #[serde(rename = "@revision")]
    revision: u64,
    /// Absent for anonymous commits.
    #[serde(default)]
    author: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    msg: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// `svn` client bound to one repository URL and one workspace base.
#[derive(Debug, Clone)]
pub struct SvnClient {
    repository_url: String,
    repository_name: String,
    user: Option<String>,
    password: Option<String>,
    workspace: PathBuf,
}

impl SvnClient {
    pub fn new(svn: &SvnSection, workspace: &Path) -> Self {
        let repository_url = svn.repository_url.trim().to_string();
        Self {
            repository_name: repository_name_from_url(&repository_url),
            repository_url,
            user: svn.user.clone().filter(|u| !u.is_empty()),
            password: svn.password.clone().filter(|p| !p.is_empty()),
            workspace: workspace.to_path_buf(),
        }
    }

    pub fn repository_url(&self) -> &str {
        &self.repository_url
    }

    /// Last path segment of the repository URL.
    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    fn svn(&self) -> Command {
        let mut cmd = Command::new("svn");
        cmd.args(["--non-interactive", "--no-auth-cache"]);
        if let Some(user) = &self.user {
            cmd.args(["--username", user]);
        }
        if let Some(password) = &self.password {
            cmd.args(["--password", password]);
        }
        cmd
    }
}

impl SourceRevisionProvider for SvnClient {
    fn max_revision(&self) -> Result<u64, VcsError> {
        let xml = run_for_stdout(self.svn().args(["info", "--xml"]).arg(&self.repository_url))?;
        let revision = parse_info_revision(&xml)?;
        tracing::info!(url = %self.repository_url, revision, "max revision");
        Ok(revision)
    }

    fn working_copy_name(&self) -> String {
        format!("svn_{}", self.repository_name)
    }

    fn checkout_at(&mut self, revision: RevisionNumber) -> Result<WorkingCopy, VcsError> {
        let name = self.working_copy_name();
        let path = self.workspace.join(&name);
        tracing::info!(%revision, path = %path.display(), "checkout");
        run_for_stdout(
            self.svn()
                .args(["checkout", "--quiet", "-r"])
                .arg(revision.to_string())
                .arg(&self.repository_url)
                .arg(&path),
        )?;
        Ok(WorkingCopy { name, path })
    }

    fn update_to(
        &mut self,
        working_copy: &WorkingCopy,
        revision: RevisionNumber,
    ) -> Result<(), VcsError> {
        tracing::info!(%revision, path = %working_copy.path.display(), "update");
        run_for_stdout(
            self.svn()
                .args(["update", "--quiet", "-r"])
                .arg(revision.to_string())
                .arg(&working_copy.path),
        )?;
        Ok(())
    }

    fn commit_info(
        &self,
        working_copy: &WorkingCopy,
        revision: RevisionNumber,
    ) -> Result<CommitInfo, VcsError> {
        // `^/` is the repository root, so revisions that only touch paths
        // outside the checked-out subtree still yield their log entry.
        let xml = run_for_stdout(
            self.svn()
                .current_dir(&working_copy.path)
                .args(["log", "--xml", "-r"])
                .arg(format!("{revision}:{revision}"))
                .arg("^/"),
        )?;
        let info = parse_log_entry(&xml, revision)?;
        tracing::info!("{info}");
        Ok(info)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Last non-empty path segment of `url`; `"repository"` when there is none.
pub fn repository_name_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let path = without_query
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map(|(_, p)| p).unwrap_or(""))
        .unwrap_or(without_query);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("repository")
        .to_string()
}

/// Revision of the single `<entry>` in `svn info --xml` output.
pub(crate) fn parse_info_revision(xml: &str) -> Result<u64, VcsError> {
    let info: InfoXml = quick_xml::de::from_str(xml).map_err(|e| VcsError::Parse {
        what: "svn info xml",
        message: e.to_string(),
    })?;
    Ok(info.entry.revision)
}

/// The one `<logentry>` for `revision` in `svn log --xml` output.
pub(crate) fn parse_log_entry(xml: &str, revision: RevisionNumber) -> Result<CommitInfo, VcsError> {
    let log: LogXml = quick_xml::de::from_str(xml).map_err(|e| VcsError::Parse {
        what: "svn log xml",
        message: e.to_string(),
    })?;

    let mut matching = log.entries.into_iter().filter(|e| e.revision == revision.0);
    let entry = match (matching.next(), matching.next()) {
        (Some(entry), None) => entry,
        (None, _) => {
            return Err(VcsError::LogEntryCount {
                revision: revision.0,
                found: 0,
            })
        }
        (Some(_), Some(_)) => {
            return Err(VcsError::LogEntryCount {
                revision: revision.0,
                found: 2 + matching.count(),
            })
        }
    };

    let date = entry.date.ok_or_else(|| VcsError::Parse {
        what: "svn log date",
        message: format!("revision {revision} has no <date>"),
    })?;
    let timestamp = DateTime::parse_from_rfc3339(date.trim()).map_err(|e| VcsError::Parse {
        what: "svn log date",
        message: format!("'{date}': {e}"),
    })?;

    Ok(CommitInfo {
        author: entry.author.trim().to_string(),
        message: entry.msg,
        timestamp,
        revision,
    })
}
