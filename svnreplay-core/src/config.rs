//! YAML replay configuration.
//!
//! # File layout
//!
//! ```text
//! workspace: ./workspace
//! git:
//!   project: myproject
//!   commit_msg_svn_nr: true
//! svn:
//!   repository_url: https://svn.example.org/repos/myproject
//!   user: ""
//!   password: ""
//!   revision_limit: 0
//!   usermap:
//!     - "username = email"
//! logging:
//!   logfile: null
//!   loglevel: info
//! ```
//!
//! # API pattern
//!
//! Functions take the config file path explicitly (`*_at`). The CLI resolves
//! that path once via [`default_path`] and hands the loaded, immutable
//! [`ReplayConfig`] to every component.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{config_io_err, ConfigError};
use crate::identity;
use crate::types::ProjectName;

/// File name looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "svnreplay.yaml";

const PROJECT_PLACEHOLDER: &str = "<enter project name here>";
const URL_PLACEHOLDER: &str = "<enter svn url here>";

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// Root of the YAML config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Base directory for the working copy and the destination repository.
    /// Relative paths resolve against the config file's directory.
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,
    pub git: GitSection,
    pub svn: SvnSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSection {
    /// Destination folder name inside the workspace.
    pub project: String,
    /// Prefix commit messages with `#<rev>: `.
    #[serde(default = "default_true")]
    pub commit_msg_svn_nr: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvnSection {
    pub repository_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Highest revision to replay; `0` replays everything.
    #[serde(default)]
    pub revision_limit: u64,
    /// Ordered `"name = email"` entries.
    #[serde(default)]
    pub usermap: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub logfile: Option<PathBuf>,
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
}

/// The slice of configuration the revision pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySettings {
    pub project: ProjectName,
    pub revision_limit: u64,
    pub usermap: Vec<String>,
    pub prefix_revision: bool,
}

fn default_workspace() -> PathBuf {
    PathBuf::from("./workspace")
}

fn default_true() -> bool {
    true
}

fn default_loglevel() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            logfile: None,
            loglevel: default_loglevel(),
        }
    }
}

impl Default for ReplayConfig {
    /// Placeholder config written by `svnreplay init`.
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            git: GitSection {
                project: PROJECT_PLACEHOLDER.to_string(),
                commit_msg_svn_nr: true,
            },
            svn: SvnSection {
                repository_url: URL_PLACEHOLDER.to_string(),
                user: None,
                password: None,
                revision_limit: 0,
                usermap: vec!["username = email".to_string()],
            },
            logging: LoggingSection::default(),
        }
    }
}

impl ReplayConfig {
    /// Reject configs that still carry placeholders or unusable names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let project = self.git.project.trim();
        if project.is_empty() || project == PROJECT_PLACEHOLDER {
            return Err(ConfigError::Invalid {
                key: "git.project",
                reason: "set the destination project name".to_string(),
            });
        }
        if project == "." || project == ".." || project.contains(['/', '\\']) {
            return Err(ConfigError::Invalid {
                key: "git.project",
                reason: format!("'{project}' must be a plain folder name"),
            });
        }

        let url = self.svn.repository_url.trim();
        if url.is_empty() || url == URL_PLACEHOLDER {
            return Err(ConfigError::Invalid {
                key: "svn.repository_url",
                reason: "set the Subversion repository URL".to_string(),
            });
        }

        for entry in identity::malformed_entries(&self.svn.usermap) {
            tracing::warn!(entry, "usermap entry is not of the form 'name = email'; ignored");
        }
        Ok(())
    }

    /// Absolute workspace base, resolving a relative `workspace` against
    /// `config_dir`.
    pub fn workspace_base(&self, config_dir: &Path) -> PathBuf {
        if self.workspace.is_absolute() {
            self.workspace.clone()
        } else {
            config_dir.join(&self.workspace)
        }
    }

    pub fn replay_settings(&self) -> ReplaySettings {
        ReplaySettings {
            project: ProjectName::from(self.git.project.trim()),
            revision_limit: self.svn.revision_limit,
            usermap: self.svn.usermap.clone(),
            prefix_revision: self.git.commit_msg_svn_nr,
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Path lookup
// ---------------------------------------------------------------------------

/// `<config_dir>/svnreplay/config.yaml`. Pure, no I/O.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("svnreplay").join("config.yaml"))
}

/// Config path used when none is given: `./svnreplay.yaml` if present, else
/// the per-user config if present, else `./svnreplay.yaml`.
pub fn default_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    match user_config_path() {
        Some(user) if user.exists() => user,
        _ => local,
    }
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load the config at `path`.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<ReplayConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| config_io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `path`.
///
/// Write flow: serialize → `.tmp` sibling → `chmod 0600` → `rename`.
/// The file may hold the SVN password, hence the restrictive mode.
pub fn save_at(path: &Path, config: &ReplayConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| config_io_err(dir, e))?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| config_io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path).map_err(|e| config_io_err(path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 5. Init
// ---------------------------------------------------------------------------

/// Write a placeholder config at `path`.
///
/// Idempotent unless `force`: an existing file is loaded and returned
/// unchanged, with `false` as the second tuple element.
pub fn init_at(path: &Path, force: bool) -> Result<(ReplayConfig, bool), ConfigError> {
    if path.exists() && !force {
        return Ok((load_at(path)?, false));
    }
    let config = ReplayConfig::default();
    save_at(path, &config)?;
    Ok((config, true))
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| config_io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
