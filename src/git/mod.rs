//! Utilities for invoking `git` for the `autopush` application.

use crate::{
    errors::{CommandFailure, GitError, GitResult},
    log::LogSink,
};
use itertools::Itertools;
use std::io;

mod ops;

mod runner;
#[cfg(test)]
pub use runner::ScriptedGit;
pub use runner::{GitRunner, SystemGit};

/// A completed, successful `git` invocation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GitOutput {
    /// The full argument vector, including the program name.
    pub args: Vec<String>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// The exit status. Always `0`.
    pub status: i32,
}

impl GitOutput {
    /// A one-line summary of what the process printed: the first line of stdout, or
    /// the last line of stderr if stdout was empty.
    pub fn summary(&self) -> Option<&str> {
        self.stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .or_else(|| {
                self.stderr
                    .lines()
                    .rev()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
            })
    }
}

/// Runs `git` through a [GitRunner], writing every invocation and its output to a
/// [LogSink].
pub struct Git<'a, R> {
    runner: R,
    sink: &'a dyn LogSink,
}

impl<'a, R: GitRunner> Git<'a, R> {
    /// Creates a new [Git] with the given runner and log sink.
    pub fn new(runner: R, sink: &'a dyn LogSink) -> Self {
        Self { runner, sink }
    }

    /// The log sink every invocation is reported to.
    pub fn sink(&self) -> &'a dyn LogSink {
        self.sink
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Invokes `git` with `args`.
    ///
    /// ## Takes
    /// - `args` - The arguments to pass, excluding the program name.
    ///
    /// ## Returns
    /// - `Ok(GitOutput)` - The process exited with status `0`.
    /// - `Err(GitError::CommandFailed)` - The process exited with a non-zero status.
    /// - `Err(GitError::NotFound)` - The binary does not exist. Callers must not recover.
    /// - `Err(GitError::Io)` - Spawning or waiting on the process failed.
    pub async fn invoke(&self, args: &[&str]) -> GitResult<GitOutput> {
        let program = self.runner.program();
        let full_args = std::iter::once(program)
            .chain(args.iter().copied())
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>();
        self.sink
            .info(&format!("Executing: {}", full_args.iter().join(" ")));

        let raw = match self.runner.run(args).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.sink.error("Git not found in PATH");
                return Err(GitError::NotFound {
                    program: program.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let stdout = raw.stdout.trim();
        if !stdout.is_empty() {
            self.sink.info(&format!("STDOUT: {}", stdout));
        }
        let stderr = raw.stderr.trim();
        if !stderr.is_empty() {
            self.sink.warn(&format!("STDERR: {}", stderr));
        }
        self.sink.info(&format!("Return code: {}", raw.status));

        if raw.status != 0 {
            let failure = CommandFailure {
                args: full_args,
                status: raw.status,
                stdout: raw.stdout,
                stderr: raw.stderr,
            };
            self.sink.error(&format!("Command failed: {}", failure));
            self.sink
                .error(&format!("Error output: {}", failure.stderr.trim_end()));
            return Err(GitError::CommandFailed(failure));
        }

        Ok(GitOutput {
            args: full_args,
            stdout: raw.stdout,
            stderr: raw.stderr,
            status: raw.status,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{Git, ScriptedGit};
    use crate::{
        errors::GitError,
        log::{Level, MemorySink},
    };

    #[tokio::test]
    async fn logs_invocation_and_streams() {
        let sink = MemorySink::default();
        let git = Git::new(
            ScriptedGit::new().respond("status --porcelain", 0, " M a.rs\n", "hint: x\n"),
            &sink,
        );

        let output = git.invoke(&["status", "--porcelain"]).await.unwrap();
        assert_eq!(output.args, vec!["git", "status", "--porcelain"]);
        assert_eq!(output.stdout, " M a.rs\n");
        assert_eq!(
            sink.rendered(),
            vec![
                "[INFO] Executing: git status --porcelain",
                "[INFO] STDOUT: M a.rs",
                "[WARN] STDERR: hint: x",
                "[INFO] Return code: 0",
            ]
        );
    }

    #[tokio::test]
    async fn summary_prefers_stdout() {
        let sink = MemorySink::default();
        let git = Git::new(
            ScriptedGit::new()
                .respond("commit -m x", 0, "\n[main 0a1b2c3] x\n 1 file changed\n", "")
                .ok_stderr("push origin main", "To host:repo.git\n   1f2e..0a1b  main -> main\n"),
            &sink,
        );

        let commit = git.invoke(&["commit", "-m", "x"]).await.unwrap();
        assert_eq!(commit.summary(), Some("[main 0a1b2c3] x"));
        let push = git.invoke(&["push", "origin", "main"]).await.unwrap();
        assert_eq!(push.summary(), Some("1f2e..0a1b  main -> main"));
        let add = git.invoke(&["add", "."]).await.unwrap();
        assert_eq!(add.summary(), None);
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_structured_failure() {
        let sink = MemorySink::default();
        let git = Git::new(
            ScriptedGit::new().fail("push origin main", 1, "error: failed to push\n"),
            &sink,
        );

        let err = git.invoke(&["push", "origin", "main"]).await.unwrap_err();
        let failure = match err {
            GitError::CommandFailed(failure) => failure,
            other => panic!("expected a command failure, got {other:?}"),
        };
        assert_eq!(failure.status, 1);
        assert_eq!(failure.stderr, "error: failed to push\n");
        assert!(sink.contains(Level::Error, "Command failed: Command 'git push origin main'"));
        assert!(sink.contains(Level::Error, "Error output: error: failed to push"));
    }

    #[tokio::test]
    async fn missing_binary_is_fatal() {
        let sink = MemorySink::default();
        let git = Git::new(ScriptedGit::new().missing(), &sink);

        let err = git.invoke(&["--version"]).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(sink.contains(Level::Error, "Git not found in PATH"));
        assert!(!sink.contains(Level::Info, "Return code"));
    }
}
