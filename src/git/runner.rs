//! The process boundary: spawning the external `git` binary.

use crate::constants::GIT_PROGRAM;
use std::{env, io};
use tokio::process::Command;
use tracing::{debug, trace};

/// The raw result of a process that ran to completion.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RawOutput {
    /// The exit status. `-1` if the process was terminated by a signal.
    pub status: i32,
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

/// Something that can run `git` with an argument vector.
///
/// An [io::ErrorKind::NotFound] error from [GitRunner::run] means the binary itself is
/// missing.
#[allow(async_fn_in_trait)]
pub trait GitRunner {
    /// The program name, as shown in log lines.
    fn program(&self) -> &str;

    /// Runs the program with `args` in the current working directory and waits for it
    /// to exit.
    async fn run(&self, args: &[&str]) -> io::Result<RawOutput>;
}

/// Runs the `git` found on the system `PATH` (or at an explicit path).
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: String,
}

impl SystemGit {
    /// Creates a runner for the given program path or name.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new(GIT_PROGRAM)
    }
}

impl GitRunner for SystemGit {
    fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, args: &[&str]) -> io::Result<RawOutput> {
        debug!(
            program = %self.program,
            ?args,
            cwd = ?env::current_dir().ok(),
            "Spawning process"
        );

        let output = Command::new(&self.program).args(args).output().await?;

        let raw = RawOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(status = raw.status, "Process exited");

        Ok(raw)
    }
}

/// A fake [GitRunner] that answers from a script keyed by the space-joined argument
/// vector, and records every call it receives.
///
/// Unscripted invocations succeed with empty output.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedGit {
    responses: Vec<(String, RawOutput)>,
    missing: bool,
    calls: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl ScriptedGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// A script for a repository with one modified file, a reachable `origin` and a
    /// `main` branch.
    pub fn happy(message: &str) -> Self {
        Self::new()
            .ok("rev-parse --git-dir", ".git\n")
            .ok("status --porcelain", " M src/lib.rs\n")
            .ok("ls-remote origin --exit-code", "1f2e3d4c\tHEAD\n1f2e3d4c\trefs/heads/main\n")
            .ok(&format!("commit -m {}", message), "[main 0a1b2c3] done\n 1 file changed\n")
            .ok("branch --show-current", "main\n")
            .ok_stderr("push origin main", "To example.com:repo.git\n   1f2e3d4..0a1b2c3  main -> main\n")
            .ok("rev-parse HEAD", "0a1b2c3d4e5f60718293a4b5c6d7e8f901234567\n")
    }

    /// Scripts a successful invocation with the given stdout.
    pub fn ok(self, args: &str, stdout: &str) -> Self {
        self.respond(args, 0, stdout, "")
    }

    /// Scripts a successful invocation with the given stderr.
    pub fn ok_stderr(self, args: &str, stderr: &str) -> Self {
        self.respond(args, 0, "", stderr)
    }

    /// Scripts a failing invocation.
    pub fn fail(self, args: &str, status: i32, stderr: &str) -> Self {
        self.respond(args, status, "", stderr)
    }

    /// Makes every invocation report the binary as missing.
    pub fn missing(mut self) -> Self {
        self.missing = true;
        self
    }

    pub fn respond(mut self, args: &str, status: i32, stdout: &str, stderr: &str) -> Self {
        self.responses.push((
            args.to_string(),
            RawOutput {
                status,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        ));
        self
    }

    /// Every argument vector received so far, space-joined.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn was_called(&self, args: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == args)
    }

    /// Whether any call starts with the given subcommand.
    pub fn ran_subcommand(&self, subcommand: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|c| c.split(' ').next() == Some(subcommand))
    }
}

#[cfg(test)]
impl GitRunner for ScriptedGit {
    fn program(&self) -> &str {
        GIT_PROGRAM
    }

    async fn run(&self, args: &[&str]) -> io::Result<RawOutput> {
        let key = args.join(" ");
        self.calls.borrow_mut().push(key.clone());

        if self.missing {
            return Err(io::ErrorKind::NotFound.into());
        }

        Ok(self
            .responses
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, raw)| raw.clone())
            .unwrap_or_default())
    }
}
