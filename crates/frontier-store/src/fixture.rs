//! Scratch repositories for tests (testing only)
//!
//! [`ScratchRepo`] creates a bare `origin.git` and a clone `work/` inside a
//! temporary directory, with one initial commit pushed. Everything is driven
//! through the blocking `git` CLI so helpers can be used from sync and async
//! tests alike. Helpers panic on failure.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// A bare origin plus a working clone, removed on drop.
pub struct ScratchRepo {
    _dir: TempDir,
    origin: PathBuf,
    work: PathBuf,
}

fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("failed to run git {args:?}: {e}"));
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

impl ScratchRepo {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let origin = dir.path().join("origin.git");
        let work = dir.path().join("work");

        run_git(dir.path(), &["init", "--quiet", "--bare", "origin.git"]);
        run_git(dir.path(), &["clone", "--quiet", "origin.git", "work"]);
        run_git(&work, &["config", "user.name", "test-user"]);
        run_git(&work, &["config", "user.email", "test@example.com"]);
        run_git(&work, &["config", "commit.gpgsign", "false"]);
        run_git(&work, &["commit", "--quiet", "--allow-empty", "-m", "initial"]);
        run_git(&work, &["push", "--quiet", "origin", "HEAD"]);

        Ok(Self {
            _dir: dir,
            origin,
            work,
        })
    }

    /// Root of the working clone.
    pub fn work_dir(&self) -> &Path {
        &self.work
    }

    /// Run git in the working clone and return stdout.
    pub fn git(&self, args: &[&str]) -> String {
        run_git(&self.work, args)
    }

    /// Write a file (creating parents) without staging it.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.work.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.work.join(relative)).unwrap()
    }

    /// Write, commit and push a single file.
    pub fn commit_file(&self, relative: &str, contents: &str) {
        self.write(relative, contents);
        self.git(&["add", "--", relative]);
        self.git(&["commit", "--quiet", "-m", &format!("seed {relative}")]);
        self.git(&["push", "--quiet", "origin", "HEAD"]);
    }

    /// Number of commits reachable from HEAD.
    pub fn commit_count(&self) -> usize {
        self.git(&["rev-list", "--count", "HEAD"])
            .trim()
            .parse()
            .unwrap()
    }

    /// Files touched by `revision`, relative to the root.
    pub fn files_in(&self, revision: &str) -> Vec<String> {
        self.git(&["show", "--name-only", "--no-renames", "--format=", revision])
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Commit SHA the origin's current-branch ref points to.
    pub fn origin_head(&self) -> String {
        let branch = self.git(&["rev-parse", "--abbrev-ref", "HEAD"]);
        run_git(&self.origin, &["rev-parse", branch.trim()])
            .trim()
            .to_string()
    }

    /// Point the remote at a path that does not exist so pushes fail.
    pub fn break_remote(&self) {
        let missing = self.origin.with_file_name("missing.git");
        self.git(&["remote", "set-url", "origin", missing.to_str().unwrap()]);
    }
}
