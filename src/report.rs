//! Read-only diagnostics about the local `git` environment.

use crate::{
    errors::GitResult,
    git::{Git, GitRunner},
};
use tracing::instrument;

/// A read-only `git` invocation and what it reports.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Diagnostic {
    pub args: &'static [&'static str],
    pub description: &'static str,
}

/// The diagnostics run by [report_environment], in order.
pub const DIAGNOSTICS: [Diagnostic; 6] = [
    Diagnostic {
        args: &["--version"],
        description: "Git version",
    },
    Diagnostic {
        args: &["config", "--get", "user.name"],
        description: "User name",
    },
    Diagnostic {
        args: &["config", "--get", "user.email"],
        description: "User email",
    },
    Diagnostic {
        args: &["remote", "-v"],
        description: "Remote repositories",
    },
    Diagnostic {
        args: &["branch", "-a"],
        description: "All branches",
    },
    Diagnostic {
        args: &["log", "--oneline", "-5"],
        description: "Recent commits",
    },
];

/// Logs the output of every entry in [DIAGNOSTICS].
///
/// A failing diagnostic is logged as a warning and the rest still run. Only a missing
/// `git` binary is returned as an error.
#[instrument(skip_all)]
pub async fn report_environment<R: GitRunner>(git: &Git<'_, R>) -> GitResult<()> {
    let sink = git.sink();
    sink.info("=== Git Environment Debug Info ===");

    for diagnostic in DIAGNOSTICS {
        sink.info(&format!("Checking: {}", diagnostic.description));
        match git.invoke(diagnostic.args).await {
            Ok(_) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => sink.warn(&format!(
                "Could not get {}: {}",
                diagnostic.description.to_lowercase(),
                e
            )),
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::{report_environment, DIAGNOSTICS};
    use crate::{
        git::{Git, ScriptedGit},
        log::{Level, MemorySink},
    };

    #[tokio::test]
    async fn runs_every_diagnostic_in_order() {
        let sink = MemorySink::default();
        let git = Git::new(
            ScriptedGit::new()
                .ok("--version", "git version 2.43.0\n")
                .ok("config --get user.name", "Ada\n"),
            &sink,
        );

        report_environment(&git).await.unwrap();

        assert_eq!(
            git.runner().calls(),
            vec![
                "--version",
                "config --get user.name",
                "config --get user.email",
                "remote -v",
                "branch -a",
                "log --oneline -5",
            ]
        );
        assert_eq!(
            sink.lines().first(),
            Some(&(Level::Info, "=== Git Environment Debug Info ===".to_string()))
        );
        assert!(sink.contains(Level::Info, "STDOUT: git version 2.43.0"));
        assert_eq!(DIAGNOSTICS.len(), 6);
    }

    #[tokio::test]
    async fn failures_are_warnings() {
        let sink = MemorySink::default();
        let git = Git::new(
            ScriptedGit::new()
                .fail("config --get user.email", 1, "")
                .fail("log --oneline -5", 128, "fatal: your current branch 'main' does not have any commits yet"),
            &sink,
        );

        report_environment(&git).await.unwrap();

        assert_eq!(git.runner().calls().len(), 6);
        assert!(sink.contains(Level::Warn, "Could not get user email: Command 'git config --get user.email' returned non-zero exit status 1."));
        assert!(sink.contains(Level::Warn, "Could not get recent commits:"));
    }

    #[tokio::test]
    async fn missing_binary_stops_the_report() {
        let sink = MemorySink::default();
        let git = Git::new(ScriptedGit::new().missing(), &sink);

        assert!(report_environment(&git).await.unwrap_err().is_fatal());
        assert_eq!(git.runner().calls(), vec!["--version"]);
    }
}
