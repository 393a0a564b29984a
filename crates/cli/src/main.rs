mod config;
mod discover;
mod git;
mod output;
mod references;
mod resume;
mod stdin;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "handoff-resume",
    about = "SessionStart hook: resume the previous session from its handoff record"
)]
pub struct Cli {
    /// Project root; defaults to the current directory
    #[arg(long, env = "CLAUDE_PROJECT_DIR")]
    project_dir: Option<PathBuf>,

    /// Plugin install root, used to locate bundled reference docs
    #[arg(long, env = "CLAUDE_PLUGIN_ROOT")]
    plugin_root: Option<PathBuf>,

    /// Branch to resume instead of the current git branch
    #[arg(long)]
    branch: Option<String>,

    /// Config file to use instead of the project/user lookup
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip reading the host's stdin payload
    #[arg(long)]
    no_stdin: bool,

    /// Copy plugin reference docs into the project, then exit
    #[arg(long, hide = true)]
    bg_copy_refs: bool,
}

impl Cli {
    fn project_dir(&self) -> Result<PathBuf> {
        match &self.project_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = if cli.bg_copy_refs {
        references::run_bg_copy(&cli)
    } else {
        resume::run_resume(&cli).await
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
