//! Repository inspection.
//!
//! Collects everything version derivation needs from a git working tree in a
//! single [`RepoSnapshot`]. HEAD and the branch name are read with gix; the
//! describe string and working tree status come from the `git` binary, since
//! they must match `git describe --always --dirty --abbrev=40` and
//! `git status` output exactly.

use std::path::Path;
use std::process::Command;

use anyhow::{
    Context,
    Result,
};
use bstr::ByteSlice;

/// Branch name reported when HEAD is not a symbolic reference.
pub const DETACHED_BRANCH: &str = "detached";

/// Immutable view of the repository state at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSnapshot {
    /// Full hex id of the HEAD commit.
    pub commit_hash: String,
    /// Output of `git describe --always --dirty --abbrev=40`.
    pub describe: String,
    /// Short branch name, or [`DETACHED_BRANCH`].
    pub branch: String,
    /// Tracked files have uncommitted changes.
    pub dirty: bool,
    /// Number of untracked files in the working tree.
    pub untracked_count: usize,
}

/// Inspect the git repository at `repo_path`.
///
/// # Errors
///
/// Returns an error if:
/// - No git repository can be discovered at `repo_path`
/// - HEAD does not point to a commit (e.g. a repository without commits)
/// - `git describe` or `git status` cannot be run or fails
pub fn inspect(repo_path: &Path) -> Result<RepoSnapshot> {
    let repo = gix::discover(repo_path).with_context(|| {
        format!(
            "Failed to discover git repository at {}",
            repo_path.display()
        )
    })?;

    let head = repo.head().context("Failed to read HEAD")?;
    let commit_hash = head
        .id()
        .context("HEAD does not point to a commit")?
        .to_string();
    let branch = head
        .referent_name()
        .map(|name| name.shorten().to_str_lossy().into_owned())
        .unwrap_or_else(|| DETACHED_BRANCH.to_string());

    let describe = git_output(
        repo_path,
        &["describe", "--always", "--dirty", "--abbrev=40"],
    )?
    .trim()
    .to_string();

    // Count every untracked file, whatever `status.showUntrackedFiles` says.
    let status = git_output(
        repo_path,
        &["status", "--porcelain", "--untracked-files=all"],
    )?;
    let (dirty, untracked_count) = parse_porcelain_status(&status);

    Ok(RepoSnapshot {
        commit_hash,
        describe,
        branch,
        dirty,
        untracked_count,
    })
}

/// Run `git <args>` in `repo_path` and return its stdout.
fn git_output(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

    if !output.status.success() {
        anyhow::bail!(
            "git {} failed in {}: {}",
            args.join(" "),
            repo_path.display(),
            output.stderr.to_str_lossy().trim()
        );
    }

    Ok(output.stdout.to_str_lossy().into_owned())
}

/// Count dirty and untracked entries in `git status --porcelain` output.
fn parse_porcelain_status(status: &str) -> (bool, usize) {
    let mut dirty = false;
    let mut untracked = 0;
    for line in status.lines() {
        if line.starts_with("??") {
            untracked += 1;
        } else if !line.trim().is_empty() && !line.starts_with("!!") {
            dirty = true;
        }
    }
    (dirty, untracked)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn git(dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {:?} failed", args);
    }

    /// Create a repository with one commit on branch `main`.
    fn init_test_git_repo() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "--initial-branch=main"]);
        git(dir.path(), &["config", "user.email", "test@example.com"]);
        git(dir.path(), &["config", "user.name", "Test User"]);
        git(dir.path(), &["config", "commit.gpgsign", "false"]);
        git(dir.path(), &["config", "tag.gpgsign", "false"]);
        fs::write(dir.path().join("README"), "hello\n").unwrap();
        git(dir.path(), &["add", "README"]);
        git(dir.path(), &["commit", "-m", "Initial commit"]);
        dir
    }

    #[test]
    fn test_parse_porcelain_status() {
        assert_eq!(parse_porcelain_status(""), (false, 0));
        assert_eq!(parse_porcelain_status("?? a\n?? b\n"), (false, 2));
        assert_eq!(parse_porcelain_status(" M src/lib.rs\n"), (true, 0));
        assert_eq!(parse_porcelain_status("A  new.rs\n?? tmp\n"), (true, 1));
        assert_eq!(parse_porcelain_status("!! target/\n"), (false, 0));
    }

    #[test]
    #[serial_test::serial]
    fn test_inspect_clean_repo() {
        let dir = init_test_git_repo();
        let snapshot = inspect(dir.path()).unwrap();

        assert_eq!(snapshot.commit_hash.len(), 40);
        assert_eq!(snapshot.describe, snapshot.commit_hash);
        assert_eq!(snapshot.branch, "main");
        assert!(!snapshot.dirty);
        assert_eq!(snapshot.untracked_count, 0);
    }

    #[test]
    #[serial_test::serial]
    fn test_inspect_tagged_dirty_repo() {
        let dir = init_test_git_repo();
        git(dir.path(), &["tag", "-a", "v1.4.0", "-m", "release"]);
        fs::write(dir.path().join("README"), "changed\n").unwrap();
        fs::write(dir.path().join("scratch.txt"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "y").unwrap();

        let snapshot = inspect(dir.path()).unwrap();
        assert_eq!(snapshot.describe, "v1.4.0-dirty");
        assert!(snapshot.dirty);
        assert_eq!(snapshot.untracked_count, 2);
    }

    #[test]
    #[serial_test::serial]
    fn test_inspect_counts_files_in_untracked_directory() {
        let dir = init_test_git_repo();
        let generated = dir.path().join("gen");
        fs::create_dir(&generated).unwrap();
        for name in ["a", "b", "c"] {
            fs::write(generated.join(name), name).unwrap();
        }

        let snapshot = inspect(dir.path()).unwrap();
        assert_eq!(snapshot.untracked_count, 3);
        assert!(!snapshot.dirty);
    }

    #[test]
    #[serial_test::serial]
    fn test_inspect_ignores_show_untracked_files_setting() {
        let dir = init_test_git_repo();
        git(dir.path(), &["config", "status.showUntrackedFiles", "no"]);
        let generated = dir.path().join("gen");
        fs::create_dir(&generated).unwrap();
        for name in ["a", "b", "c"] {
            fs::write(generated.join(name), name).unwrap();
        }

        let snapshot = inspect(dir.path()).unwrap();
        assert_eq!(snapshot.untracked_count, 3);
        let info = crate::version::derive(&snapshot);
        assert!(info.proj_version.ends_with("-untracked"));
    }

    #[test]
    #[serial_test::serial]
    fn test_inspect_commits_since_tag() {
        let dir = init_test_git_repo();
        git(dir.path(), &["tag", "-a", "v2.0", "-m", "release"]);
        fs::write(dir.path().join("README"), "next\n").unwrap();
        git(dir.path(), &["commit", "-am", "Second commit"]);

        let snapshot = inspect(dir.path()).unwrap();
        assert_eq!(
            snapshot.describe,
            format!("v2.0-1-g{}", snapshot.commit_hash)
        );
    }

    #[test]
    #[serial_test::serial]
    fn test_inspect_detached_head() {
        let dir = init_test_git_repo();
        git(dir.path(), &["checkout", "--detach"]);

        let snapshot = inspect(dir.path()).unwrap();
        assert_eq!(snapshot.branch, DETACHED_BRANCH);
    }

    #[test]
    fn test_inspect_not_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = inspect(&missing).unwrap_err();
        assert!(
            err.to_string()
                .contains("Failed to discover git repository")
        );
    }
}
