use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn svnreplay_cmd(cwd: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("svnreplay"));
    cmd.current_dir(cwd)
        .env("HOME", cwd)
        .env("XDG_CONFIG_HOME", cwd.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, project: &str, url: &str) -> PathBuf {
    let path = dir.join("svnreplay.yaml");
    let yaml = format!(
        "workspace: ws\n\
         git:\n  project: {project}\n  commit_msg_svn_nr: true\n\
         svn:\n  repository_url: {url}\n  revision_limit: 0\n  usermap:\n    - alice = alice@example.org\n    - bob = bob@example.org\n\
         logging:\n  logfile: replay.log\n  loglevel: debug\n"
    );
    fs::write(&path, yaml).expect("write config");
    path
}

fn have(tool: &str) -> bool {
    Command::new(tool)
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

#[test]
fn help_lists_subcommands() {
    let tmp = TempDir::new().expect("tmp");
    svnreplay_cmd(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("init").and(contains("info")).and(contains("run")));
}

#[test]
fn init_writes_placeholder_config_once() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("conf/replay.yaml");

    svnreplay_cmd(tmp.path())
        .args(["init", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("Wrote config"));
    let written = fs::read_to_string(&path).expect("config");
    assert!(written.contains("<enter project name here>"));
    assert!(written.contains("<enter svn url here>"));

    fs::write(&path, written.replace("<enter project name here>", "kept")).expect("edit");
    svnreplay_cmd(tmp.path())
        .args(["init", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("already exists"));
    assert!(fs::read_to_string(&path).expect("config").contains("kept"));

    svnreplay_cmd(tmp.path())
        .args(["init", "--force", "--config"])
        .arg(&path)
        .assert()
        .success();
    assert!(!fs::read_to_string(&path).expect("config").contains("kept"));
}

#[test]
fn init_defaults_to_local_config_file() {
    let tmp = TempDir::new().expect("tmp");
    svnreplay_cmd(tmp.path()).arg("init").assert().success();
    assert!(tmp.path().join("svnreplay.yaml").is_file());
}

#[test]
fn run_without_config_points_at_init() {
    let tmp = TempDir::new().expect("tmp");
    svnreplay_cmd(tmp.path())
        .args(["run", "--config", "missing.yaml"])
        .assert()
        .failure()
        .stderr(contains("svnreplay init"));
}

#[test]
fn run_rejects_placeholder_config() {
    let tmp = TempDir::new().expect("tmp");
    svnreplay_cmd(tmp.path()).arg("init").assert().success();

    svnreplay_cmd(tmp.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(contains("git.project"));
    assert!(!tmp.path().join("workspace").exists(), "nothing may be created");
}

#[test]
fn run_refuses_existing_destination_before_contacting_svn() {
    let tmp = TempDir::new().expect("tmp");
    let config = write_config(tmp.path(), "demo", "file:///nonexistent/svnreplay/repo");
    let leftover = tmp.path().join("ws/demo");
    fs::create_dir_all(&leftover).expect("leftover");
    fs::write(leftover.join("keep.txt"), "from an earlier run").expect("sentinel");

    svnreplay_cmd(tmp.path())
        .args(["run", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("already exists"));

    assert_eq!(
        fs::read_to_string(leftover.join("keep.txt")).expect("sentinel"),
        "from an earlier run"
    );
    assert!(!tmp.path().join("ws/svn_repo").exists());
    let log = fs::read_to_string(tmp.path().join("replay.log")).expect("log file");
    assert!(log.contains("replay aborted"), "log: {log}");
}

#[test]
fn info_json_reports_invalid_config_without_querying() {
    let tmp = TempDir::new().expect("tmp");
    svnreplay_cmd(tmp.path()).arg("init").assert().success();

    let output = svnreplay_cmd(tmp.path())
        .args(["info", "--json"])
        .output()
        .expect("run info");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["valid"], false);
    assert!(json["problem"].as_str().unwrap_or_default().contains("git.project"));
    assert!(json["max_revision"].is_null());
    assert_eq!(json["usermap_entries"], 1);
}

/// Full run against a local repository; skipped when svn or git is missing.
#[test]
fn replays_a_local_repository_into_git() {
    if !(have("svn") && have("svnadmin") && have("git")) {
        eprintln!("svn, svnadmin, or git not installed; skipping");
        return;
    }
    let tmp = TempDir::new().expect("tmp");
    let repo = tmp.path().join("repo");
    let wc = tmp.path().join("scratch");
    let status = Command::new("svnadmin").arg("create").arg(&repo).status().expect("svnadmin");
    assert!(status.success());
    let url = format!("file://{}", repo.display());

    let svn = |args: &[&str]| {
        let status = Command::new("svn")
            .args(["--non-interactive", "--username", "alice"])
            .args(args)
            .current_dir(&wc)
            .status()
            .expect("svn");
        assert!(status.success(), "svn {args:?}");
    };
    let status = Command::new("svn")
        .args(["checkout", "--quiet", &url])
        .arg(&wc)
        .status()
        .expect("checkout");
    assert!(status.success());

    fs::write(wc.join("a.txt"), "one\n").expect("write");
    svn(&["add", "--quiet", "a.txt"]);
    svn(&["commit", "--quiet", "-m", "first"]);
    fs::write(wc.join("b.txt"), "two\n").expect("write");
    svn(&["add", "--quiet", "b.txt"]);
    svn(&["commit", "--quiet", "-m", "second"]);
    svn(&["rm", "--quiet", "a.txt"]);
    svn(&["commit", "--quiet", "-m", "third"]);

    let config = write_config(tmp.path(), "demo", &url);
    svnreplay_cmd(tmp.path())
        .args(["run", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("Replayed 3/3"));

    let project = tmp.path().join("ws/demo");
    let log = Command::new("git")
        .args(["log", "--reverse", "--format=%s|%ae"])
        .current_dir(&project)
        .output()
        .expect("git log");
    let subjects = String::from_utf8_lossy(&log.stdout).to_string();
    assert_eq!(
        subjects.lines().collect::<Vec<_>>(),
        vec![
            "#1: first|alice@example.org",
            "#2: second|alice@example.org",
            "#3: third|alice@example.org",
        ]
    );
    assert!(!project.join("a.txt").exists());
    assert_eq!(fs::read_to_string(project.join("b.txt")).expect("b"), "two\n");
    assert!(!project.join(".svn").exists());
    assert!(!tmp.path().join("ws/svn_repo").exists(), "working copy left behind");
}
