//! `svnreplay info`: what a run would do, without doing it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use svnreplay_core::{config, SourceRevisionProvider};
use svnreplay_sync::pipeline::upper_bound;
use svnreplay_sync::Workspace;
use svnreplay_vcs::SvnClient;

use super::{config_dir, ConfigArg};

/// Arguments for `svnreplay info`.
#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct InfoReport {
    config: PathBuf,
    valid: bool,
    problem: Option<String>,
    repository_url: String,
    repository_name: String,
    working_copy: PathBuf,
    destination: PathBuf,
    /// `None` when the repository could not be queried.
    max_revision: Option<u64>,
    upper_bound: Option<u64>,
    revision_limit: u64,
    rev_prefix: bool,
    usermap_entries: usize,
}

#[derive(Tabled)]
struct InfoRow {
    #[tabled(rename = "setting")]
    key: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

impl InfoArgs {
    pub fn run(self) -> Result<()> {
        let path = self.config.path();
        let config = config::load_at(&path).with_context(|| {
            format!("failed to load config '{}'; run `svnreplay init` first", path.display())
        })?;
        let problem = config.validate().err().map(|e| e.to_string());

        let base = config.workspace_base(&config_dir(&path));
        let workspace = Workspace::new(&base);
        let client = SvnClient::new(&config.svn, &base);

        // Querying a placeholder URL only produces a confusing svn error.
        let max_revision = match &problem {
            Some(_) => Err("config is not valid".to_string()),
            None => client.max_revision().map_err(|e| e.to_string()),
        };

        let report = InfoReport {
            config: path.clone(),
            valid: problem.is_none(),
            problem,
            repository_url: client.repository_url().to_string(),
            repository_name: client.repository_name().to_string(),
            working_copy: workspace.folder(&client.working_copy_name()),
            destination: workspace.folder(config.git.project.trim()),
            max_revision: max_revision.as_ref().ok().copied(),
            upper_bound: max_revision
                .as_ref()
                .ok()
                .map(|max| upper_bound(*max, config.svn.revision_limit)),
            revision_limit: config.svn.revision_limit,
            rev_prefix: config.git.commit_msg_svn_nr,
            usermap_entries: config.svn.usermap.len(),
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize info JSON")?
            );
            return Ok(());
        }
        print_table(&report, max_revision.err());
        Ok(())
    }
}

fn print_table(report: &InfoReport, query_error: Option<String>) {
    println!("svnreplay v{} | {}", env!("CARGO_PKG_VERSION"), report.config.display());

    let revision = |value: Option<u64>| match value {
        Some(n) => n.to_string(),
        None => "unknown".to_string(),
    };
    let rows = vec![
        InfoRow {
            key: "repository",
            value: report.repository_url.clone(),
        },
        InfoRow {
            key: "repository name",
            value: report.repository_name.clone(),
        },
        InfoRow {
            key: "working copy",
            value: report.working_copy.display().to_string(),
        },
        InfoRow {
            key: "destination",
            value: report.destination.display().to_string(),
        },
        InfoRow {
            key: "max revision",
            value: revision(report.max_revision),
        },
        InfoRow {
            key: "revision limit",
            value: match report.revision_limit {
                0 => "none".to_string(),
                n => n.to_string(),
            },
        },
        InfoRow {
            key: "replay range",
            value: match report.upper_bound {
                Some(0) => "empty".to_string(),
                Some(n) => format!("1..={n}"),
                None => "unknown".to_string(),
            },
        },
        InfoRow {
            key: "rev prefix",
            value: if report.rev_prefix { "#<rev>: " } else { "off" }.to_string(),
        },
        InfoRow {
            key: "usermap entries",
            value: report.usermap_entries.to_string(),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    match &report.problem {
        Some(problem) => println!("{} {problem}", "✗".red().bold()),
        None => println!("{} config is valid", "✓".green().bold()),
    }
    if let (None, Some(error)) = (&report.problem, query_error) {
        println!("{} cannot query repository: {error}", "!".yellow().bold());
    }
    if report.destination.exists() {
        println!(
            "{} destination already exists; 'svnreplay run' will refuse to start",
            "!".yellow().bold()
        );
    }
}
