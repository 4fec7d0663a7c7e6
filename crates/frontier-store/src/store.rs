//! Capability contract against a versioned working tree.
//!
//! The archive never touches repository internals. Everything it needs from
//! the store is on [`VersionedStore`]:
//! - working-tree path and scoped status
//! - stage, commit+push as one step, reset-and-clean of a subpath
//! - revision identifier and URLs for human-facing links
//!
//! Calling these methods directly bypasses the store lock. Go through
//! [`crate::RepositoryAccessManager`] for anything that mutates the tree.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::status::StoreStatus;

/// Identifier of a committed revision (a git commit SHA for [`crate::GitStore`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn new(id: impl Into<String>) -> Self {
        RevisionId(id.into())
    }

    /// Return the full identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 8 chars).
    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for RevisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A versioned working tree.
///
/// Paths passed in may be absolute (inside [`working_dir`](Self::working_dir))
/// or relative to it. Paths reported back in [`StoreStatus`] are relative to
/// the working tree root and `/`-separated.
#[async_trait]
pub trait VersionedStore: Send + Sync {
    /// Root of the working tree.
    fn working_dir(&self) -> &Path;

    /// File that writers in other processes lock before touching the tree.
    ///
    /// `None` means only writers within this process are serialized.
    fn lock_file(&self) -> Option<PathBuf> {
        None
    }

    /// Added, changed, removed and untracked files under `path`.
    async fn status(&self, path: &Path) -> StoreResult<StoreStatus>;

    /// Stage every modification, addition and deletion under `path`.
    async fn stage_all(&self, path: &Path) -> StoreResult<()>;

    /// Commit the staged set and push it. On push failure the local commit
    /// is undone before the error is returned.
    async fn commit_and_push(&self, message: &str) -> StoreResult<RevisionId>;

    /// Discard every uncommitted modification under `path`, restoring it to
    /// the last committed state.
    async fn reset_and_clean(&self, path: &Path) -> StoreResult<()>;

    /// Revision the working tree is currently based on.
    async fn current_revision(&self) -> StoreResult<RevisionId>;

    /// Browsable base URL of the repository.
    async fn origin_url(&self) -> StoreResult<String>;

    /// Base URL serving raw committed files.
    async fn raw_file_base_url(&self) -> StoreResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_short_truncates() {
        let rev = RevisionId::new("0123456789abcdef");
        assert_eq!(rev.short(), "01234567");
        assert_eq!(rev.to_string(), "0123456789abcdef");
    }

    #[test]
    fn revision_short_of_short_id() {
        assert_eq!(RevisionId::new("abc").short(), "abc");
    }
}
