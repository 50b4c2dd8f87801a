//! The individual `git` operations the workflow and report are built from.

use super::{Git, GitOutput, GitRunner};
use crate::{
    constants::{NOTHING_TO_COMMIT, SHORT_HASH_LEN},
    errors::{CommandFailure, GitError, GitResult},
};

/// Returns `true` if a failed `git commit` only failed because nothing was staged.
///
/// The phrase can land on either stream depending on the `git` build, so both are
/// checked.
pub fn is_nothing_to_commit(failure: &CommandFailure) -> bool {
    failure.stderr.contains(NOTHING_TO_COMMIT) || failure.stdout.contains(NOTHING_TO_COMMIT)
}

/// Truncates a revision identifier to its display length.
pub fn short_hash(revision: &str) -> String {
    revision.trim().chars().take(SHORT_HASH_LEN).collect()
}

impl<R: GitRunner> Git<'_, R> {
    /// Checks whether the current working directory is inside a repository.
    ///
    /// ## Returns
    /// - `Ok(true)` - The directory is inside a repository.
    /// - `Ok(false)` - `git` rejected the directory.
    /// - `Err(_)` - `git` could not be run at all.
    pub async fn check_repository(&self) -> GitResult<bool> {
        self.sink.info("Verifying git repository...");
        match self.invoke(&["rev-parse", "--git-dir"]).await {
            Ok(_) => {
                self.sink.info("Valid git repository confirmed");
                Ok(true)
            }
            Err(GitError::CommandFailed(_)) => {
                self.sink.error("Not a git repository");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Lists the porcelain status lines for every changed path in the working tree.
    pub async fn changed_files(&self) -> GitResult<Vec<String>> {
        self.sink.info("Checking git status...");
        let output = self.invoke(&["status", "--porcelain"]).await?;
        let files = output
            .stdout
            .trim()
            .lines()
            .filter(|line| !line.is_empty())
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>();
        self.sink
            .info(&format!("Found {} changed files", files.len()));
        Ok(files)
    }

    /// Checks whether `remote` can be reached and advertises at least one ref.
    pub async fn validate_remote(&self, remote: &str) -> GitResult<bool> {
        self.sink
            .info(&format!("Validating remote '{}' connection...", remote));
        match self.invoke(&["ls-remote", remote, "--exit-code"]).await {
            Ok(_) => {
                self.sink.info("Remote connection validated");
                Ok(true)
            }
            Err(GitError::CommandFailed(_)) => {
                self.sink
                    .error(&format!("Cannot connect to remote '{}'", remote));
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Stages every change in the working tree.
    pub async fn add_all(&self) -> GitResult<GitOutput> {
        self.sink.info("Adding all files to staging...");
        let output = self.invoke(&["add", "."]).await?;
        self.sink.info("Files added to staging area");
        Ok(output)
    }

    /// Commits the staged changes.
    ///
    /// ## Returns
    /// - `Ok(Some(_))` - A commit was created.
    /// - `Ok(None)` - There was nothing to commit.
    /// - `Err(_)` - The commit failed for any other reason.
    pub async fn commit(&self, message: &str) -> GitResult<Option<GitOutput>> {
        self.sink
            .info(&format!("Committing with message: '{}'", message));
        match self.invoke(&["commit", "-m", message]).await {
            Ok(output) => {
                self.sink.info("Commit successful");
                Ok(Some(output))
            }
            Err(GitError::CommandFailed(failure)) if is_nothing_to_commit(&failure) => {
                self.sink.warn("Nothing to commit, working tree clean");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns the name of the checked out branch, or an empty string on a detached HEAD.
    pub async fn current_branch(&self) -> GitResult<String> {
        let output = self.invoke(&["branch", "--show-current"]).await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Pushes `branch` to `remote`, detecting the current branch if none is given.
    pub async fn push(&self, remote: &str, branch: Option<&str>) -> GitResult<GitOutput> {
        let branch = match branch {
            Some(branch) => branch.to_string(),
            None => self.current_branch().await?,
        };

        self.sink
            .info(&format!("Pushing to {}/{}...", remote, branch));
        let output = self.invoke(&["push", remote, branch.as_str()]).await?;
        self.sink.info("Push successful");
        Ok(output)
    }

    /// Returns the shortened identifier of the commit at `HEAD`.
    pub async fn head_commit(&self) -> GitResult<String> {
        let output = self.invoke(&["rev-parse", "HEAD"]).await?;
        let hash = short_hash(&output.stdout);
        self.sink.info(&format!("Latest commit: {}", hash));
        Ok(hash)
    }
}

#[cfg(test)]
mod test {
    use super::{is_nothing_to_commit, short_hash};
    use crate::{
        errors::{CommandFailure, GitError},
        git::{Git, ScriptedGit},
        log::{Level, MemorySink},
    };

    fn commit_failure(stdout: &str, stderr: &str) -> CommandFailure {
        CommandFailure {
            args: vec!["git".into(), "commit".into()],
            status: 1,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    #[test]
    fn short_hash_keeps_eight_characters() {
        assert_eq!(
            short_hash("0a1b2c3d4e5f60718293a4b5c6d7e8f901234567\n"),
            "0a1b2c3d"
        );
        assert_eq!(short_hash("0a1b2c3d").len(), 8);
        assert_eq!(short_hash("abc"), "abc");
    }

    #[test]
    fn nothing_to_commit_matches_either_stream() {
        assert!(is_nothing_to_commit(&commit_failure(
            "",
            "nothing to commit, working tree clean"
        )));
        assert!(is_nothing_to_commit(&commit_failure(
            "On branch main\nnothing to commit, working tree clean\n",
            ""
        )));
        assert!(!is_nothing_to_commit(&commit_failure(
            "",
            "fatal: unable to auto-detect email address"
        )));
    }

    #[tokio::test]
    async fn repository_check_turns_failure_into_false() {
        let sink = MemorySink::default();
        let git = Git::new(
            ScriptedGit::new().fail(
                "rev-parse --git-dir",
                128,
                "fatal: not a git repository (or any of the parent directories): .git",
            ),
            &sink,
        );

        assert!(!git.check_repository().await.unwrap());
        assert!(sink.contains(Level::Error, "Not a git repository"));
    }

    #[tokio::test]
    async fn repository_check_propagates_missing_binary() {
        let sink = MemorySink::default();
        let git = Git::new(ScriptedGit::new().missing(), &sink);

        let err = git.check_repository().await.unwrap_err();
        assert!(matches!(err, GitError::NotFound { .. }));
    }

    #[tokio::test]
    async fn changed_files_splits_porcelain_lines() {
        let sink = MemorySink::default();
        let git = Git::new(
            ScriptedGit::new().ok("status --porcelain", " M src/main.rs\n?? notes.txt\n"),
            &sink,
        );

        let files = git.changed_files().await.unwrap();
        assert_eq!(files, vec!["M src/main.rs", "?? notes.txt"]);
        assert!(sink.contains(Level::Info, "Found 2 changed files"));

        let sink = MemorySink::default();
        let git = Git::new(ScriptedGit::new().ok("status --porcelain", ""), &sink);
        assert!(git.changed_files().await.unwrap().is_empty());
        assert!(sink.contains(Level::Info, "Found 0 changed files"));
    }

    #[tokio::test]
    async fn commit_with_nothing_staged_is_benign() {
        let sink = MemorySink::default();
        let git = Git::new(
            ScriptedGit::new().fail("commit -m msg", 1, "nothing to commit, working tree clean"),
            &sink,
        );

        assert_eq!(git.commit("msg").await.unwrap(), None);
        assert!(sink.contains(Level::Warn, "Nothing to commit, working tree clean"));
    }

    #[tokio::test]
    async fn commit_failure_is_propagated() {
        let sink = MemorySink::default();
        let git = Git::new(
            ScriptedGit::new().fail("commit -m msg", 128, "fatal: empty ident name not allowed"),
            &sink,
        );

        let err = git.commit("msg").await.unwrap_err();
        assert!(matches!(err, GitError::CommandFailed(ref f) if f.status == 128));
    }

    #[tokio::test]
    async fn push_detects_the_current_branch() {
        let sink = MemorySink::default();
        let git = Git::new(
            ScriptedGit::new().ok("branch --show-current", "feature/x\n"),
            &sink,
        );

        git.push("upstream", None).await.unwrap();
        assert_eq!(
            git.runner().calls(),
            vec!["branch --show-current", "push upstream feature/x"]
        );
        assert!(sink.contains(Level::Info, "Pushing to upstream/feature/x..."));
    }

    #[tokio::test]
    async fn push_uses_an_explicit_branch() {
        let sink = MemorySink::default();
        let git = Git::new(ScriptedGit::new(), &sink);

        git.push("origin", Some("release")).await.unwrap();
        assert_eq!(git.runner().calls(), vec!["push origin release"]);
    }

    #[tokio::test]
    async fn head_commit_is_shortened() {
        let sink = MemorySink::default();
        let git = Git::new(
            ScriptedGit::new().ok("rev-parse HEAD", "fedcba9876543210fedcba9876543210fedcba98\n"),
            &sink,
        );

        assert_eq!(git.head_commit().await.unwrap(), "fedcba98");
        assert!(sink.contains(Level::Info, "Latest commit: fedcba98"));
    }
}
