//! `svnreplay run [--limit <n>] [--no-rev-prefix]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use svnreplay_core::config;
use svnreplay_sync::{Outcome, Pipeline, PipelineReport, Workspace};
use svnreplay_vcs::{GitRepository, SvnClient};

use super::{config_dir, ConfigArg};
use crate::logging;

/// Replay the source history into a new Git repository.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Stop after this revision (overrides svn.revision_limit; 0 = all).
    #[arg(long, value_name = "N")]
    pub limit: Option<u64>,

    /// Commit the source message as-is, without the "#<rev>: " prefix.
    #[arg(long)]
    pub no_rev_prefix: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let path = self.config.path();
        let mut config = config::load_at(&path).with_context(|| {
            format!("failed to load config '{}'; run `svnreplay init` first", path.display())
        })?;
        if let Some(limit) = self.limit {
            config.svn.revision_limit = limit;
        }
        if self.no_rev_prefix {
            config.git.commit_msg_svn_nr = false;
        }
        config
            .validate()
            .with_context(|| format!("invalid config '{}'", path.display()))?;

        let dir = config_dir(&path);
        logging::init(&config.logging, &dir)?;

        let base = config.workspace_base(&dir);
        let settings = config.replay_settings();
        let workspace = Workspace::new(&base);
        let source = SvnClient::new(&config.svn, &base);
        let project_dir = workspace.folder(&settings.project.0);
        let destination = GitRepository::new(&project_dir);
        tracing::info!(
            url = source.repository_url(),
            workspace = %base.display(),
            project = %settings.project,
            "starting replay"
        );

        println!("Replaying {} into {}", source.repository_url(), project_dir.display());
        let mut pipeline = Pipeline::new(settings, workspace, source, destination);
        let report = pipeline.run();
        print_summary(&report);

        match report.outcome {
            Outcome::Completed => Ok(()),
            Outcome::Aborted { revision, error } => {
                let at = match revision {
                    Some(r) => format!("replay aborted at revision {r}"),
                    None => "replay aborted before the first revision".to_string(),
                };
                Err(anyhow::Error::new(error).context(at))
            }
        }
    }
}

fn print_summary(report: &PipelineReport) {
    let committed = report.committed.len();
    let elapsed = format!("{:.1}s", report.elapsed.as_secs_f64());
    let range = match report.upper_bound {
        Some(upper) => format!("{committed}/{upper}"),
        None => committed.to_string(),
    };

    if report.is_success() {
        println!("{} Replayed {range} revisions in {elapsed}", "✓".green().bold());
    } else {
        println!("{} Replay aborted after {range} revisions in {elapsed}", "✗".red().bold());
        if let Some(last) = report.committed.last() {
            println!("  Destination keeps revisions 1..={last}");
        }
    }
}
