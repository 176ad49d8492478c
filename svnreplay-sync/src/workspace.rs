//! Workspace manager: named folders under one base directory.
//!
//! ```text
//! <workspace>/
//!   <git.project>/      destination repository (created once per run)
//!   svn_<repo name>/    source working copy (deleted at the end of a run)
//! ```
//!
//! Folder names are relative to the base; the empty name is the base itself.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{io_err, ReplayError};

#[derive(Debug, Clone)]
pub struct Workspace {
    base: PathBuf,
}

impl Workspace {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Full path of `name` inside the workspace. Pure, no I/O.
    pub fn folder(&self, name: &str) -> PathBuf {
        if name.is_empty() {
            self.base.clone()
        } else {
            self.base.join(name)
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.folder(name).is_dir()
    }

    /// Create `name` (and any missing parents). Existing folders are fine.
    pub fn create(&self, name: &str) -> Result<PathBuf, ReplayError> {
        let path = self.folder(name);
        if !path.is_dir() {
            tracing::info!(path = %path.display(), "create workspace folder");
            fs::create_dir_all(&path).map_err(|source| ReplayError::WorkspaceUncreatable {
                path: path.clone(),
                source,
            })?;
        }
        Ok(path)
    }

    /// Delete `name` with all content. Missing folders are fine.
    ///
    /// Read-only entries (svn marks some pristine files that way) are made
    /// writable and the removal retried once.
    pub fn delete(&self, name: &str) -> Result<(), ReplayError> {
        let path = self.folder(name);
        if !path.exists() {
            return Ok(());
        }
        tracing::debug!(path = %path.display(), "delete workspace folder");
        match fs::remove_dir_all(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                make_writable(&path)?;
                fs::remove_dir_all(&path).map_err(|e| io_err(&path, e))
            }
            Err(e) => Err(io_err(&path, e)),
        }
    }

    /// Move folder `src` to `dst` inside the workspace.
    pub fn rename(&self, src: &str, dst: &str) -> Result<(), ReplayError> {
        let from = self.folder(src);
        let to = self.folder(dst);
        tracing::debug!(from = %from.display(), to = %to.display(), "rename workspace folder");
        fs::rename(&from, &to).map_err(|e| io_err(&from, e))
    }

    /// Recursively copy folder `src` to `dst`, which must not exist yet.
    pub fn copy(&self, src: &str, dst: &str) -> Result<(), ReplayError> {
        let from = self.folder(src);
        let to = self.folder(dst);
        if to.exists() {
            return Err(io_err(&to, std::io::Error::from(ErrorKind::AlreadyExists)));
        }
        tracing::debug!(from = %from.display(), to = %to.display(), "copy workspace folder");

        for entry in WalkDir::new(&from).sort_by_file_name() {
            let entry = entry.map_err(|source| ReplayError::Walk {
                root: from.clone(),
                source,
            })?;
            let rel = entry.path().strip_prefix(&from).unwrap_or(entry.path());
            let target = to.join(rel);
            let file_type = entry.file_type();
            if file_type.is_dir() {
                fs::create_dir_all(&target).map_err(|e| io_err(&target, e))?;
            } else if file_type.is_symlink() {
                crate::reconcile::copy_symlink(entry.path(), &target)?;
            } else {
                fs::copy(entry.path(), &target).map_err(|e| io_err(&target, e))?;
            }
        }
        Ok(())
    }
}

fn make_writable(root: &Path) -> Result<(), ReplayError> {
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_symlink() {
            continue;
        }
        let path = entry.path();
        let mut perms = fs::metadata(path).map_err(|e| io_err(path, e))?.permissions();
        set_owner_writable(&mut perms);
        fs::set_permissions(path, perms).map_err(|e| io_err(path, e))?;
    }
    Ok(())
}

#[cfg(unix)]
fn set_owner_writable(perms: &mut fs::Permissions) {
    use std::os::unix::fs::PermissionsExt;
    perms.set_mode(perms.mode() | 0o700);
}
#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn set_owner_writable(perms: &mut fs::Permissions) {
    perms.set_readonly(false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path().join("workspace"));
        (tmp, ws)
    }

    #[test]
    fn create_base_and_named_folder() {
        let (_tmp, ws) = workspace();
        assert!(!ws.exists(""));
        ws.create("").expect("base");
        assert!(ws.exists(""));
        let project = ws.create("project").expect("project");
        assert_eq!(project, ws.base().join("project"));
        assert!(ws.exists("project"));
        ws.create("project").expect("create is idempotent");
    }

    #[test]
    fn create_under_a_file_fails() {
        let (tmp, _) = workspace();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "file, not a dir").unwrap();
        let ws = Workspace::new(&blocker);
        let err = ws.create("").unwrap_err();
        assert!(matches!(err, ReplayError::WorkspaceUncreatable { .. }), "got: {err}");
    }

    #[test]
    fn delete_removes_tree_and_tolerates_missing() {
        let (_tmp, ws) = workspace();
        let wc = ws.create("svn_repo").unwrap();
        fs::create_dir_all(wc.join("a/b")).unwrap();
        fs::write(wc.join("a/b/c.txt"), "x").unwrap();
        ws.delete("svn_repo").expect("delete");
        assert!(!ws.exists("svn_repo"));
        ws.delete("svn_repo").expect("second delete is a no-op");
    }

    #[test]
    #[cfg(unix)]
    fn delete_handles_read_only_directories() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, ws) = workspace();
        let wc = ws.create("svn_repo").unwrap();
        let locked = wc.join(".svn").join("pristine");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("ab.svn-base"), "base").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        ws.delete("svn_repo").expect("delete read-only tree");
        assert!(!ws.exists("svn_repo"));
    }

    #[test]
    fn rename_and_copy() {
        let (_tmp, ws) = workspace();
        let src = ws.create("one").unwrap();
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("sub/file.txt"), "payload").unwrap();

        ws.copy("one", "two").expect("copy");
        assert_eq!(fs::read_to_string(ws.folder("two").join("sub/file.txt")).unwrap(), "payload");
        assert!(ws.exists("one"));

        ws.rename("two", "three").expect("rename");
        assert!(!ws.exists("two"));
        assert!(ws.folder("three").join("sub/file.txt").is_file());
    }

    #[test]
    fn copy_refuses_existing_destination() {
        let (_tmp, ws) = workspace();
        ws.create("one").unwrap();
        ws.create("two").unwrap();
        assert!(ws.copy("one", "two").is_err());
    }
}
