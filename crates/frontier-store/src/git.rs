//! Git-backed [`VersionedStore`] driven through the `git` command line.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::status::StoreStatus;
use crate::store::{RevisionId, VersionedStore};

/// Connection details for one git working tree.
#[derive(Debug, Clone)]
pub struct GitStoreConfig {
    /// Root of the (already cloned) working tree
    pub path: PathBuf,
    /// Remote that commits are pushed to
    pub remote: String,
    /// Browsable base URL; derived from the remote URL when unset
    pub web_url: Option<String>,
    /// Raw-file base URL; falls back to the browsable URL when unset
    pub raw_url: Option<String>,
    /// Committer/author name
    pub author_name: String,
    /// Committer/author email
    pub author_email: String,
}

impl GitStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            remote: "origin".to_string(),
            web_url: None,
            raw_url: None,
            author_name: "frontier-archive".to_string(),
            author_email: "frontier-archive@localhost".to_string(),
        }
    }

    pub fn with_web_url(mut self, url: impl Into<String>) -> Self {
        self.web_url = Some(url.into());
        self
    }

    pub fn with_raw_url(mut self, url: impl Into<String>) -> Self {
        self.raw_url = Some(url.into());
        self
    }

    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_name = name.into();
        self.author_email = email.into();
        self
    }
}

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    StdCommand::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Name of the lock file inside the repository's git directory.
pub const LOCK_FILE_NAME: &str = "frontier.lock";

fn absolute_git_dir(dir: &Path) -> Option<PathBuf> {
    let output = StdCommand::new("git")
        .args(["rev-parse", "--absolute-git-dir"])
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let git_dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!git_dir.is_empty()).then(|| PathBuf::from(git_dir))
}

/// A cloned git repository used as a versioned store.
#[derive(Debug)]
pub struct GitStore {
    config: GitStoreConfig,
    git_dir: PathBuf,
}

impl GitStore {
    /// Open the working tree described by `config`.
    ///
    /// Fails with [`StoreError::NotARepository`] if the path is not a git
    /// work tree. The repository must already have at least one commit.
    pub fn open(config: GitStoreConfig) -> StoreResult<Self> {
        if !is_git_repo(&config.path) {
            return Err(StoreError::NotARepository(config.path));
        }
        let Some(git_dir) = absolute_git_dir(&config.path) else {
            return Err(StoreError::NotARepository(config.path));
        };
        Ok(Self { config, git_dir })
    }

    pub fn config(&self) -> &GitStoreConfig {
        &self.config
    }

    /// Run `git -C <root> <args>` and return its stdout.
    async fn git<I, S>(&self, args: I) -> StoreResult<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let command = format!(
            "git {}",
            args.iter()
                .map(|a| a.as_ref().to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.config.path)
            .args(&args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(StoreError::CommandFailed { command, stderr });
        }

        debug!(command = %command, "git command succeeded");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Convert `path` to a pathspec relative to the working tree root.
    fn pathspec(&self, path: &Path) -> StoreResult<PathBuf> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.config.path)
                .map_err(|_| StoreError::InvalidPath(path.to_path_buf()))?
                .to_path_buf()
        } else {
            path.to_path_buf()
        };

        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(StoreError::InvalidPath(path.to_path_buf()));
        }

        if relative.as_os_str().is_empty() {
            Ok(PathBuf::from("."))
        } else {
            Ok(relative)
        }
    }

    async fn tracked_in_head(&self, spec: &Path) -> StoreResult<bool> {
        let listing = self
            .git([
                OsStr::new("ls-tree"),
                OsStr::new("-r"),
                OsStr::new("--name-only"),
                OsStr::new("HEAD"),
                OsStr::new("--"),
                spec.as_os_str(),
            ])
            .await?;
        Ok(!listing.trim().is_empty())
    }

    async fn remote_url(&self) -> StoreResult<String> {
        let url = self
            .git(["remote", "get-url", self.config.remote.as_str()])
            .await?;
        let url = url.trim();
        Ok(url.strip_suffix(".git").unwrap_or(url).to_string())
    }
}

#[async_trait]
impl VersionedStore for GitStore {
    fn working_dir(&self) -> &Path {
        &self.config.path
    }

    fn lock_file(&self) -> Option<PathBuf> {
        Some(self.git_dir.join(LOCK_FILE_NAME))
    }

    async fn status(&self, path: &Path) -> StoreResult<StoreStatus> {
        let spec = self.pathspec(path)?;
        let output = self
            .git([
                OsStr::new("status"),
                OsStr::new("--porcelain=v1"),
                OsStr::new("-z"),
                OsStr::new("--no-renames"),
                OsStr::new("--untracked-files=all"),
                OsStr::new("--"),
                spec.as_os_str(),
            ])
            .await?;
        Ok(StoreStatus::from_porcelain(&output))
    }

    async fn stage_all(&self, path: &Path) -> StoreResult<()> {
        let spec = self.pathspec(path)?;
        self.git([
            OsStr::new("add"),
            OsStr::new("--all"),
            OsStr::new("--"),
            spec.as_os_str(),
        ])
        .await?;
        Ok(())
    }

    async fn commit_and_push(&self, message: &str) -> StoreResult<RevisionId> {
        let previous = self.current_revision().await?;

        let name = format!("user.name={}", self.config.author_name);
        let email = format!("user.email={}", self.config.author_email);
        self.git([
            "-c",
            name.as_str(),
            "-c",
            email.as_str(),
            "-c",
            "commit.gpgsign=false",
            "commit",
            "--quiet",
            "-m",
            message,
        ])
        .await?;
        let revision = self.current_revision().await?;

        if let Err(err) = self
            .git(["push", "--quiet", self.config.remote.as_str(), "HEAD"])
            .await
        {
            warn!(
                revision = %revision.short(),
                previous = %previous.short(),
                error = %err,
                "push failed, undoing local commit"
            );
            self.git(["reset", "--hard", "--quiet", previous.as_str()])
                .await?;
            return Err(StoreError::PushFailed {
                revision: revision.to_string(),
                reason: err.to_string(),
            });
        }

        Ok(revision)
    }

    async fn reset_and_clean(&self, path: &Path) -> StoreResult<()> {
        let spec = self.pathspec(path)?;

        if self.status(path).await?.has_tracked_changes() {
            self.git([
                OsStr::new("reset"),
                OsStr::new("--quiet"),
                OsStr::new("--"),
                spec.as_os_str(),
            ])
            .await?;
        }

        if self.tracked_in_head(&spec).await? {
            self.git([
                OsStr::new("checkout"),
                OsStr::new("--quiet"),
                OsStr::new("HEAD"),
                OsStr::new("--"),
                spec.as_os_str(),
            ])
            .await?;
        }

        if self.config.path.join(&spec).exists() {
            self.git([
                OsStr::new("clean"),
                OsStr::new("-f"),
                OsStr::new("-d"),
                OsStr::new("--quiet"),
                OsStr::new("--"),
                spec.as_os_str(),
            ])
            .await?;
        }

        Ok(())
    }

    async fn current_revision(&self) -> StoreResult<RevisionId> {
        let sha = self.git(["rev-parse", "HEAD"]).await?;
        let sha = sha.trim();
        if sha.is_empty() {
            return Err(StoreError::UnexpectedOutput {
                command: "git rev-parse HEAD".to_string(),
                output: String::new(),
            });
        }
        Ok(RevisionId::new(sha))
    }

    async fn origin_url(&self) -> StoreResult<String> {
        match &self.config.web_url {
            Some(url) => Ok(url.trim_end_matches('/').to_string()),
            None => self.remote_url().await,
        }
    }

    async fn raw_file_base_url(&self) -> StoreResult<String> {
        match &self.config.raw_url {
            Some(url) => Ok(url.trim_end_matches('/').to_string()),
            None => self.origin_url().await,
        }
    }
}
