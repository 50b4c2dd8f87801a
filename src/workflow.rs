//! The scripted stage, commit and push workflow.

use crate::{
    constants::{
        STEP_ADD_FILES, STEP_COMMIT, STEP_FINAL_COMMIT, STEP_PUSH, STEP_REMOTE_CHECK,
        STEP_REPO_CHECK, STEP_STATUS_CHECK,
    },
    errors::GitResult,
    git::{Git, GitOutput, GitRunner},
};
use indexmap::IndexMap;
use std::fmt;
use tracing::{debug, instrument};

/// A single unit of work in a [Workflow], with its parameters bound.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Step {
    /// Confirm the working directory is inside a repository.
    RepoCheck,
    /// List changed paths in the working tree.
    StatusCheck,
    /// Confirm the remote can be reached.
    RemoteCheck { remote: String },
    /// Stage every change.
    AddFiles,
    /// Commit the staged changes.
    Commit { message: String },
    /// Push to the remote. The current branch is detected when `branch` is [None].
    Push {
        remote: String,
        branch: Option<String>,
    },
    /// Read the shortened identifier of `HEAD`.
    FinalCommit,
}

impl Step {
    /// The human-readable label the step's result is recorded under.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RepoCheck => STEP_REPO_CHECK,
            Self::StatusCheck => STEP_STATUS_CHECK,
            Self::RemoteCheck { .. } => STEP_REMOTE_CHECK,
            Self::AddFiles => STEP_ADD_FILES,
            Self::Commit { .. } => STEP_COMMIT,
            Self::Push { .. } => STEP_PUSH,
            Self::FinalCommit => STEP_FINAL_COMMIT,
        }
    }

    /// Whether a failure of this step stops the workflow.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::AddFiles | Self::Commit { .. } | Self::Push { .. })
    }
}

/// What a step produced.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StepValue {
    /// Outcome of a repository or remote check.
    Validated(bool),
    /// Porcelain status lines, one per changed path.
    ChangedFiles(Vec<String>),
    /// The invocation that carried out a mutating step.
    Invocation(GitOutput),
    /// A shortened revision identifier.
    CommitHash(String),
}

impl fmt::Display for StepValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validated(valid) => write!(f, "{}", valid),
            Self::ChangedFiles(files) => write!(f, "{} changed files", files.len()),
            Self::Invocation(output) => {
                write!(f, "`{}` exited with {}", output.args.join(" "), output.status)?;
                match output.summary() {
                    Some(summary) => write!(f, ": {}", summary),
                    None => Ok(()),
                }
            }
            Self::CommitHash(hash) => f.write_str(hash),
        }
    }
}

/// Step label to step result, in execution order. [None] marks a step with no result.
pub type WorkflowResults = IndexMap<&'static str, Option<StepValue>>;

/// How a [Workflow] run ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WorkflowOutcome {
    /// Every step ran.
    Completed,
    /// The working directory is not a repository.
    AbortedNoRepo,
    /// The remote could not be reached.
    AbortedNoRemote,
    /// A critical step failed.
    AbortedCriticalFailure { step: &'static str },
}

impl fmt::Display for WorkflowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::AbortedNoRepo => f.write_str("aborted: not a git repository"),
            Self::AbortedNoRemote => f.write_str("aborted: remote unreachable"),
            Self::AbortedCriticalFailure { step } => write!(f, "aborted: '{}' failed", step),
        }
    }
}

/// The result of a [Workflow] run.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WorkflowReport {
    pub outcome: WorkflowOutcome,
    pub results: WorkflowResults,
}

impl WorkflowReport {
    /// Returns the recorded result for a step label, if the step ran.
    pub fn get(&self, label: &str) -> Option<&Option<StepValue>> {
        self.results.get(label)
    }

    /// The shortened `HEAD` identifier, if the final step produced one.
    pub fn commit_hash(&self) -> Option<&str> {
        match self.get(STEP_FINAL_COMMIT) {
            Some(Some(StepValue::CommitHash(hash))) => Some(hash.as_str()),
            _ => None,
        }
    }
}

/// An ordered list of [Step]s run against a [Git].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Workflow {
    steps: Vec<Step>,
}

impl Workflow {
    /// Creates the standard seven-step workflow.
    ///
    /// ## Takes
    /// - `message` - The commit message.
    /// - `remote` - The remote to validate and push to.
    /// - `branch` - The branch to push. Detected from `HEAD` when [None].
    pub fn new(message: &str, remote: &str, branch: Option<&str>) -> Self {
        Self::with_steps(vec![
            Step::RepoCheck,
            Step::StatusCheck,
            Step::RemoteCheck {
                remote: remote.to_string(),
            },
            Step::AddFiles,
            Step::Commit {
                message: message.to_string(),
            },
            Step::Push {
                remote: remote.to_string(),
                branch: branch.map(ToOwned::to_owned),
            },
            Step::FinalCommit,
        ])
    }

    /// Creates a workflow from an arbitrary ordered list of steps.
    pub fn with_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Runs every step in order until one aborts the workflow.
    ///
    /// Step failures are recorded and logged rather than returned. The only error this
    /// returns is a fatal one, i.e. `git` missing from the system.
    #[instrument(skip_all)]
    pub async fn run<R: GitRunner>(&self, git: &Git<'_, R>) -> GitResult<WorkflowReport> {
        let sink = git.sink();
        sink.info("Starting automated git workflow...");

        let mut results = WorkflowResults::new();
        let mut outcome = WorkflowOutcome::Completed;

        for step in self.steps() {
            let label = step.label();
            sink.info(&format!("Step: {}", label));

            match execute(git, step).await {
                Ok(value) => {
                    debug!(step = label, ?value, "Step finished");
                    let rejected = matches!(value, Some(StepValue::Validated(false)));
                    let unchanged =
                        matches!(&value, Some(StepValue::ChangedFiles(files)) if files.is_empty());
                    results.insert(label, value);

                    match step {
                        Step::RepoCheck if rejected => {
                            sink.error("Workflow aborted: Not a git repository");
                            return Ok(WorkflowReport {
                                outcome: WorkflowOutcome::AbortedNoRepo,
                                results,
                            });
                        }
                        Step::RemoteCheck { .. } if rejected => {
                            sink.error("Workflow aborted: Remote connection failed");
                            return Ok(WorkflowReport {
                                outcome: WorkflowOutcome::AbortedNoRemote,
                                results,
                            });
                        }
                        Step::StatusCheck if unchanged => sink.warn("No changes detected"),
                        _ => {}
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    sink.error(&format!("Step '{}' failed: {}", label, e));
                    results.insert(label, None);

                    match step {
                        // The gates never let later steps run, however they failed.
                        Step::RepoCheck => {
                            sink.error("Workflow aborted: Not a git repository");
                            return Ok(WorkflowReport {
                                outcome: WorkflowOutcome::AbortedNoRepo,
                                results,
                            });
                        }
                        Step::RemoteCheck { .. } => {
                            sink.error("Workflow aborted: Remote connection failed");
                            return Ok(WorkflowReport {
                                outcome: WorkflowOutcome::AbortedNoRemote,
                                results,
                            });
                        }
                        step if step.is_critical() => {
                            sink.error("Workflow aborted due to critical error");
                            outcome = WorkflowOutcome::AbortedCriticalFailure { step: label };
                            break;
                        }
                        _ => {}
                    }
                }
            }
        }

        sink.info("Git workflow completed");
        Ok(WorkflowReport { outcome, results })
    }
}

/// Runs a single step.
async fn execute<R: GitRunner>(git: &Git<'_, R>, step: &Step) -> GitResult<Option<StepValue>> {
    let value = match step {
        Step::RepoCheck => StepValue::Validated(git.check_repository().await?),
        Step::StatusCheck => StepValue::ChangedFiles(git.changed_files().await?),
        Step::RemoteCheck { remote } => StepValue::Validated(git.validate_remote(remote).await?),
        Step::AddFiles => StepValue::Invocation(git.add_all().await?),
        Step::Commit { message } => match git.commit(message).await? {
            Some(output) => StepValue::Invocation(output),
            None => return Ok(None),
        },
        Step::Push { remote, branch } => {
            StepValue::Invocation(git.push(remote, branch.as_deref()).await?)
        }
        Step::FinalCommit => StepValue::CommitHash(git.head_commit().await?),
    };
    Ok(Some(value))
}
