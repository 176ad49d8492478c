//! Two-phase tree reconciler.
//!
//! ## `reconcile`: plan, then apply
//!
//! 1. Scan both trees, pruning every entry whose name is in the exclude list.
//! 2. Plan removals: destination entries missing from the source, or whose
//!    kind (dir / file / symlink) changed. Only the top-most path of a
//!    removed subtree is listed.
//! 3. Plan creations: source directories missing from the destination.
//! 4. Plan copies: source files and symlinks that are missing or differ
//!    (size, executable bit, SHA-256 of content, or link target).
//! 5. Apply in that order; the first filesystem error aborts the pass.
//!
//! Excluded names are invisible on both sides, so the destination's `.git`
//! is never removed and the source's `.svn` is never copied.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::{io_err, ReplayError};

// ---------------------------------------------------------------------------
// Plan types
// ---------------------------------------------------------------------------

/// One filesystem operation, with `path` relative to both tree roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Remove a destination file, symlink, or whole directory.
    Remove { path: PathBuf },
    /// Create a directory present only in the source.
    CreateDir { path: PathBuf },
    /// Copy a new or changed file.
    CopyFile { path: PathBuf },
    /// Recreate a new or changed symlink.
    CopySymlink { path: PathBuf },
}

impl SyncAction {
    pub fn path(&self) -> &Path {
        match self {
            SyncAction::Remove { path }
            | SyncAction::CreateDir { path }
            | SyncAction::CopyFile { path }
            | SyncAction::CopySymlink { path } => path,
        }
    }
}

/// Ordered actions that make `dest` mirror `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub actions: Vec<SyncAction>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn removals(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::Remove { .. }))
    }

    pub fn copies(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::CopyFile { .. } | SyncAction::CopySymlink { .. }))
    }

    fn count(&self, pred: impl Fn(&SyncAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Dir,
    File,
    Symlink,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    kind: Kind,
    len: u64,
    executable: bool,
}

/// Relative path → entry, ordered so a directory precedes its contents and
/// a subtree is contiguous.
type Tree = BTreeMap<PathBuf, Entry>;

fn scan(root: &Path, exclude: &[&str]) -> Result<Tree, ReplayError> {
    let mut tree = Tree::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !exclude.iter().any(|x| *x == name)
        });

    for entry in walker {
        let entry = entry.map_err(|source| ReplayError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type();
        let kind = if file_type.is_symlink() {
            Kind::Symlink
        } else if file_type.is_dir() {
            Kind::Dir
        } else {
            Kind::File
        };
        let (len, executable) = if kind == Kind::File {
            let meta = entry.metadata().map_err(|source| ReplayError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            (meta.len(), is_executable(&meta))
        } else {
            (0, false)
        };
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        tree.insert(rel, Entry { kind, len, executable });
    }
    Ok(tree)
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}
#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    false
}

fn digest(path: &Path) -> Result<Vec<u8>, ReplayError> {
    let mut file = fs::File::open(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| io_err(path, e))?;
    Ok(hasher.finalize().to_vec())
}

fn differs(source: &Path, dest: &Path, rel: &Path, s: &Entry, d: &Entry) -> Result<bool, ReplayError> {
    let src_path = source.join(rel);
    let dst_path = dest.join(rel);
    match s.kind {
        Kind::Dir => Ok(false),
        Kind::File => {
            if s.len != d.len || s.executable != d.executable {
                return Ok(true);
            }
            Ok(digest(&src_path)? != digest(&dst_path)?)
        }
        Kind::Symlink => {
            let a = fs::read_link(&src_path).map_err(|e| io_err(&src_path, e))?;
            let b = fs::read_link(&dst_path).map_err(|e| io_err(&dst_path, e))?;
            Ok(a != b)
        }
    }
}

// ---------------------------------------------------------------------------
// Phase 1: plan
// ---------------------------------------------------------------------------

/// Compute the actions that make `dest` mirror `source`, touching nothing.
pub fn plan(source: &Path, dest: &Path, exclude: &[&str]) -> Result<ReconcilePlan, ReplayError> {
    for root in [source, dest] {
        if !root.is_dir() {
            return Err(io_err(root, io::Error::new(io::ErrorKind::NotFound, "not a directory")));
        }
    }

    let src_tree = scan(source, exclude)?;
    let dst_tree = scan(dest, exclude)?;
    let mut actions = Vec::new();

    // Removals first: gone from the source, or replaced by another kind.
    let mut last_removed: Option<&Path> = None;
    for (rel, d) in &dst_tree {
        if last_removed.is_some_and(|r| rel.starts_with(r)) {
            continue;
        }
        let keep = src_tree.get(rel).is_some_and(|s| s.kind == d.kind);
        if !keep {
            actions.push(SyncAction::Remove { path: rel.clone() });
            last_removed = Some(rel.as_path());
        }
    }

    let removed = |rel: &Path| {
        actions.iter().any(|a| match a {
            SyncAction::Remove { path } => rel.starts_with(path),
            _ => false,
        })
    };
    let mut additions = Vec::new();
    for (rel, s) in &src_tree {
        let present = match dst_tree.get(rel) {
            Some(d) if d.kind == s.kind && !removed(rel.as_path()) => Some(d),
            _ => None,
        };
        let needed = match present {
            None => true,
            Some(d) => differs(source, dest, rel, s, d)?,
        };
        if !needed {
            continue;
        }
        additions.push(match s.kind {
            Kind::Dir => SyncAction::CreateDir { path: rel.clone() },
            Kind::File => SyncAction::CopyFile { path: rel.clone() },
            Kind::Symlink => SyncAction::CopySymlink { path: rel.clone() },
        });
    }
    actions.extend(additions);

    Ok(ReconcilePlan {
        source: source.to_path_buf(),
        dest: dest.to_path_buf(),
        actions,
    })
}

// ---------------------------------------------------------------------------
// Phase 2: apply
// ---------------------------------------------------------------------------

/// Execute `plan` in order. Stops at the first error.
pub fn apply(plan: &ReconcilePlan) -> Result<(), ReplayError> {
    for action in &plan.actions {
        let src = plan.source.join(action.path());
        let dst = plan.dest.join(action.path());
        match action {
            SyncAction::Remove { .. } => remove_entry(&dst)?,
            SyncAction::CreateDir { .. } => {
                fs::create_dir_all(&dst).map_err(|e| io_err(&dst, e))?;
            }
            SyncAction::CopyFile { .. } => {
                remove_if_present(&dst)?;
                fs::copy(&src, &dst).map_err(|e| io_err(&dst, e))?;
            }
            SyncAction::CopySymlink { .. } => {
                remove_if_present(&dst)?;
                copy_symlink(&src, &dst)?;
            }
        }
        tracing::trace!(?action, "applied");
    }
    Ok(())
}

/// Plan and apply in one pass; returns the applied plan.
pub fn reconcile(source: &Path, dest: &Path, exclude: &[&str]) -> Result<ReconcilePlan, ReplayError> {
    let plan = plan(source, dest, exclude)?;
    apply(&plan)?;
    tracing::debug!(
        actions = plan.actions.len(),
        copies = plan.copies(),
        removals = plan.removals(),
        "reconciled {} -> {}",
        source.display(),
        dest.display()
    );
    Ok(plan)
}

fn remove_entry(path: &Path) -> Result<(), ReplayError> {
    let meta = fs::symlink_metadata(path).map_err(|e| io_err(path, e))?;
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|e| io_err(path, e))
    } else {
        fs::remove_file(path).map_err(|e| io_err(path, e))
    }
}

fn remove_if_present(path: &Path) -> Result<(), ReplayError> {
    match fs::symlink_metadata(path) {
        Ok(_) => remove_entry(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(path, e)),
    }
}

#[cfg(unix)]
pub(crate) fn copy_symlink(src: &Path, dst: &Path) -> Result<(), ReplayError> {
    let target = fs::read_link(src).map_err(|e| io_err(src, e))?;
    std::os::unix::fs::symlink(&target, dst).map_err(|e| io_err(dst, e))
}

/// Without portable symlinks, materialize the link target's content.
#[cfg(not(unix))]
pub(crate) fn copy_symlink(src: &Path, dst: &Path) -> Result<(), ReplayError> {
    fs::copy(src, dst).map(|_| ()).map_err(|e| io_err(dst, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
