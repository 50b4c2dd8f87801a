//! `env` subcommand.

use crate::{
    git::{Git, GitRunner},
    report::report_environment,
};
use anyhow::Result;
use clap::Args;

/// CLI arguments for the `env` subcommand.
#[derive(Debug, Default, Clone, Eq, PartialEq, Args)]
pub struct EnvCmd;

impl EnvCmd {
    /// Run the `env` subcommand.
    pub async fn run<R: GitRunner>(self, git: &Git<'_, R>) -> Result<()> {
        report_environment(git).await.map_err(Into::into)
    }
}
