//! `run` subcommand.

use crate::{
    constants::{DEFAULT_COMMIT_MESSAGE, DEFAULT_REMOTE},
    git::{Git, GitRunner},
    workflow::Workflow,
};
use anyhow::Result;
use clap::Args;
use tracing::info;

/// CLI arguments for the `run` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct RunCmd {
    /// The commit message.
    #[arg(short, long, default_value = DEFAULT_COMMIT_MESSAGE)]
    pub message: String,
    /// The remote to validate and push to.
    #[arg(short, long, default_value = DEFAULT_REMOTE)]
    pub remote: String,
    /// The branch to push. Defaults to the checked out branch.
    #[arg(short, long)]
    pub branch: Option<String>,
}

impl Default for RunCmd {
    fn default() -> Self {
        Self {
            message: DEFAULT_COMMIT_MESSAGE.to_string(),
            remote: DEFAULT_REMOTE.to_string(),
            branch: None,
        }
    }
}

impl RunCmd {
    /// Run the `run` subcommand.
    ///
    /// Workflow-level failures are only reported through the log stream, so this only
    /// errors when `git` itself is missing.
    pub async fn run<R: GitRunner>(self, git: &Git<'_, R>) -> Result<()> {
        let workflow = Workflow::new(&self.message, &self.remote, self.branch.as_deref());
        let report = workflow.run(git).await?;

        for (step, value) in &report.results {
            match value {
                Some(value) => info!(step, %value, "Step result"),
                None => info!(step, "Step produced no result"),
            }
        }
        info!(
            outcome = %report.outcome,
            commit = report.commit_hash().unwrap_or("-"),
            "Workflow finished"
        );
        Ok(())
    }
}
