//! Shared fixture for integration tests.
//!
//! Repositories are created with the real `git` CLI in a temporary
//! directory. Every commit gets a distinct, increasing timestamp so that
//! history order does not depend on how fast the test runs.

#![allow(dead_code)]

use std::cell::Cell;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// First commit time used by the fixture (2020-01-01T00:00:00Z).
pub const EPOCH: i64 = 1_577_836_800;

/// Test fixture that creates a real git repository.
pub struct TestRepo {
    dir: TempDir,
    clock: Cell<i64>,
}

impl TestRepo {
    /// Create an empty repository on branch `main`.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = Self {
            dir,
            clock: Cell::new(EPOCH),
        };

        repo.git(&["init", "--quiet"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.git(&["config", "tag.gpgsign", "false"]);
        repo
    }

    /// Create a repository with one commit on `main`.
    pub fn new() -> Self {
        let repo = Self::empty();
        repo.commit_file("README.md", "# Test Repo\n", "Initial commit");
        repo
    }

    /// Get the path to the repository.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file and commit it, returning the new HEAD id.
    pub fn commit_file(&self, path: &str, content: &str, message: &str) -> String {
        self.write(path, content);
        self.git(&["add", path]);
        self.commit(message)
    }

    /// Commit whatever is staged, returning the new HEAD id.
    pub fn commit(&self, message: &str) -> String {
        self.git(&["commit", "--quiet", "--allow-empty", "-m", message]);
        self.head()
    }

    /// Write a file relative to the work tree.
    pub fn write(&self, path: &str, content: &str) {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    /// Lightweight tag at HEAD.
    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    /// Annotated tag at HEAD.
    pub fn annotated_tag(&self, name: &str) {
        self.git(&["tag", "-a", name, "-m", name]);
    }

    /// HEAD id using git directly.
    pub fn head(&self) -> String {
        self.rev_parse("HEAD")
    }

    pub fn rev_parse(&self, rev: &str) -> String {
        let output = self.git_output(&["rev-parse", rev]);
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    /// Run git, panicking on failure.
    pub fn git(&self, args: &[&str]) {
        let output = self.git_output(args);
        if !output.status.success() {
            panic!(
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }

    /// Run git and return its output, whatever the exit status.
    pub fn git_output(&self, args: &[&str]) -> Output {
        run_git_at(self.path(), args, &self.tick())
    }

    /// Advance the fixture clock and return it as a git date.
    fn tick(&self) -> String {
        let now = self.clock.get() + 60;
        self.clock.set(now);
        format!("@{} +0000", now)
    }
}

/// Run git in `dir` with fixed author and committer dates.
pub fn run_git_at(dir: &Path, args: &[&str], date: &str) -> Output {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .output()
        .expect("git command failed")
}

/// Clone `source` with `--depth depth` into a new temporary directory.
pub fn shallow_clone(source: &TestRepo, depth: u32) -> TempDir {
    let target = TempDir::new().expect("failed to create temp dir");
    let url = format!("file://{}", source.path().display());
    let depth = depth.to_string();
    let output = Command::new("git")
        .args(["clone", "--quiet", "--depth", &depth, &url, "."])
        .current_dir(target.path())
        .output()
        .expect("git clone failed");
    if !output.status.success() {
        panic!(
            "git clone failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    target
}
