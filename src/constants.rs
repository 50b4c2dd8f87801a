//! Constants for the `autopush` application.

/// The external version-control binary that every invocation shells out to.
pub(crate) const GIT_PROGRAM: &str = "git";

/// Commit message used when none is supplied on the command line.
pub(crate) const DEFAULT_COMMIT_MESSAGE: &str = "Add new files and changes";

/// Remote used when none is supplied on the command line.
pub(crate) const DEFAULT_REMOTE: &str = "origin";

/// Phrase `git commit` prints when the index has nothing staged.
///
/// This is human-readable tool output, not a stable contract. Localized or future
/// `git` builds may word it differently.
pub(crate) const NOTHING_TO_COMMIT: &str = "nothing to commit";

/// Number of characters kept when displaying a revision identifier.
pub(crate) const SHORT_HASH_LEN: usize = 8;

pub(crate) const STEP_REPO_CHECK: &str = "Repository validation";
pub(crate) const STEP_STATUS_CHECK: &str = "Status check";
pub(crate) const STEP_REMOTE_CHECK: &str = "Remote validation";
pub(crate) const STEP_ADD_FILES: &str = "Add files";
pub(crate) const STEP_COMMIT: &str = "Commit changes";
pub(crate) const STEP_PUSH: &str = "Push changes";
pub(crate) const STEP_FINAL_COMMIT: &str = "Get final commit";
