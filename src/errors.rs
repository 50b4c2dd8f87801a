//! Error types for the `autopush` application.

use itertools::Itertools;
use std::fmt;
use thiserror::Error;

/// A `git` invocation that ran to completion but exited with a non-zero status.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommandFailure {
    /// The full argument vector, including the program name.
    pub args: Vec<String>,
    /// The exit status. `-1` if the process was terminated by a signal.
    pub status: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Command '{}' returned non-zero exit status {}.",
            self.args.iter().join(" "),
            self.status
        )
    }
}

#[derive(Error, Debug)]
pub enum GitError {
    /// The external binary does not exist on this system.
    #[error("`{program}` was not found in PATH")]
    NotFound { program: String },
    /// Spawning or waiting on the process failed for any other reason.
    #[error("io error: {}", .0)]
    Io(#[from] std::io::Error),
    /// The process exited with a non-zero status.
    #[error("{}", .0)]
    CommandFailed(CommandFailure),
}

impl GitError {
    /// Whether this error must terminate the whole process rather than a single step.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type GitResult<T> = Result<T, GitError>;
