//! The subcommands for the `autopush` application.

use crate::git::{Git, GitRunner};
use anyhow::Result;
use clap::Subcommand;

mod env;
pub use env::EnvCmd;

mod run;
pub use run::RunCmd;

#[derive(Debug, Clone, Eq, PartialEq, Subcommand)]
pub enum Subcommands {
    /// Print diagnostics about the local `git` environment.
    #[clap(alias = "e")]
    Env(EnvCmd),
    /// Stage, commit and push every change in the working tree.
    #[clap(alias = "r")]
    Run(RunCmd),
}

impl Subcommands {
    /// Run the subcommand against the given [Git].
    pub async fn run<R: GitRunner>(self, git: &Git<'_, R>) -> Result<()> {
        match self {
            Self::Env(args) => args.run(git).await,
            Self::Run(args) => args.run(git).await,
        }
    }
}
