//! `GitRepository` against the real `git` binary inside temp dirs.

use std::fs;
use std::path::Path;
use std::process::Command;

use chrono::DateTime;
use rstest::rstest;
use svnreplay_core::{DestinationRepository, Identity};
use svnreplay_vcs::{repository_name_from_url, GitRepository};
use tempfile::TempDir;

/// Runs a git command in the test repository and returns trimmed stdout.
fn git_stdout(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(repo)
        .args(args)
        .output()
        .expect("git command");
    assert!(output.status.success(), "git command failed: {args:?}");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn alice() -> Identity {
    Identity {
        name: "alice".to_string(),
        email: "alice@x.com".to_string(),
    }
}

fn init_repo(tmp: &TempDir) -> GitRepository {
    let root = tmp.path().join("project");
    fs::create_dir_all(&root).expect("mkdir");
    let mut repo = GitRepository::new(&root);
    repo.init().expect("git init");
    repo
}

#[test]
fn init_creates_metadata_directory() {
    let tmp = TempDir::new().unwrap();
    let repo = init_repo(&tmp);
    assert!(repo.root().join(".git").is_dir());
    assert_eq!(git_stdout(repo.root(), &["config", "core.autocrlf"]), "false");
}

#[test]
fn commit_records_identity_and_source_dates() {
    let tmp = TempDir::new().unwrap();
    let mut repo = init_repo(&tmp);
    fs::write(repo.root().join("a.txt"), "one\n").unwrap();

    let at = DateTime::parse_from_rfc3339("2011-06-15T08:30:00+02:00").unwrap();
    repo.commit_all("#1: initial import", &alice(), at).expect("commit");

    let log = git_stdout(repo.root(), &["log", "-1", "--format=%an|%ae|%at|%cn|%ce|%ct|%s"]);
    assert_eq!(
        log,
        format!("alice|alice@x.com|{0}|alice|alice@x.com|{0}|#1: initial import", at.timestamp())
    );
    assert_eq!(git_stdout(repo.root(), &["ls-files"]), "a.txt");
}

#[test]
fn deletions_are_staged() {
    let tmp = TempDir::new().unwrap();
    let mut repo = init_repo(&tmp);
    let at = DateTime::parse_from_rfc3339("2011-06-15T08:30:00Z").unwrap();

    fs::write(repo.root().join("keep.txt"), "k").unwrap();
    fs::write(repo.root().join("gone.txt"), "g").unwrap();
    repo.commit_all("add", &alice(), at).expect("commit 1");

    fs::remove_file(repo.root().join("gone.txt")).unwrap();
    repo.commit_all("remove", &alice(), at).expect("commit 2");

    assert_eq!(git_stdout(repo.root(), &["ls-files"]), "keep.txt");
}

#[test]
fn ignore_rules_do_not_drop_files() {
    let tmp = TempDir::new().unwrap();
    let mut repo = init_repo(&tmp);
    let at = DateTime::parse_from_rfc3339("2011-06-15T08:30:00Z").unwrap();

    fs::write(repo.root().join(".gitignore"), "*.log\n").unwrap();
    fs::write(repo.root().join("build.log"), "versioned in svn").unwrap();
    fs::create_dir_all(repo.root().join(".git/info")).unwrap();
    fs::write(repo.root().join(".git/info/exclude"), "vendor/\n").unwrap();
    fs::create_dir_all(repo.root().join("vendor")).unwrap();
    fs::write(repo.root().join("vendor/lib.c"), "int x;").unwrap();
    repo.commit_all("#1: import", &alice(), at).expect("commit 1");

    let files = git_stdout(repo.root(), &["ls-files"]);
    assert_eq!(files, ".gitignore\nbuild.log\nvendor/lib.c", "files: {files:?}");

    fs::write(repo.root().join("build.log"), "changed").unwrap();
    repo.commit_all("#2: touch log", &alice(), at).expect("commit 2");
    assert_eq!(
        git_stdout(repo.root(), &["show", "--name-only", "--format=", "HEAD"]),
        "build.log"
    );
}

#[test]
fn unchanged_tree_and_empty_message_still_commit() {
    let tmp = TempDir::new().unwrap();
    let mut repo = init_repo(&tmp);
    let at = DateTime::parse_from_rfc3339("2011-06-15T08:30:00Z").unwrap();

    fs::write(repo.root().join("a.txt"), "a").unwrap();
    repo.commit_all("first", &alice(), at).expect("commit 1");
    repo.commit_all("", &alice(), at).expect("commit 2");

    assert_eq!(git_stdout(repo.root(), &["rev-list", "--count", "HEAD"]), "2");
}

#[test]
fn hash_prefixed_message_is_kept_verbatim() {
    let tmp = TempDir::new().unwrap();
    let mut repo = init_repo(&tmp);
    let at = DateTime::parse_from_rfc3339("2011-06-15T08:30:00Z").unwrap();
    repo.commit_all("#7: fix bug\n\n# not a comment", &alice(), at)
        .expect("commit");

    let body = git_stdout(repo.root(), &["log", "-1", "--format=%B"]);
    assert_eq!(body, "#7: fix bug\n\n# not a comment");
}

#[rstest]
#[case("https://svn.example.org/repos/proj", "proj")]
#[case("https://svn.example.org/repos/proj/", "proj")]
#[case("svn://host/a/b/trunk", "trunk")]
#[case("file:///srv/svn/repo", "repo")]
#[case("https://host", "repository")]
#[case("https://host/repos/proj?p=1", "proj")]
fn repository_names(#[case] url: &str, #[case] name: &str) {
    assert_eq!(repository_name_from_url(url), name);
}
