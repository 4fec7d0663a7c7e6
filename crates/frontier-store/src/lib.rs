//! Frontier-Store: Versioned Working Trees for the Frontier Archive
//!
//! This crate owns the versioned repositories that hold archived frontiers.
//! Every write to a repository happens while holding that repository's
//! exclusive lock, through an [`AccessScope`].
//!
//! ## Layer 0 - Versioned Store
//!
//! Focus: mutual exclusion, commit/push atomicity, and rollback.
//!
//! ## Key Components
//!
//! - `VersionedStore`: capability contract against a versioned working tree
//! - `GitStore`: implementation over the `git` command line
//! - `RepositoryAccessManager`: one exclusive lock per store, hands out scopes
//! - `AccessScope` / `DrainGuard`: lock-held handles

pub mod access;
mod error;
pub mod fixture;
pub mod git;
mod status;
pub mod store;

pub use access::{drain_all, AccessScope, DrainGuard, RepositoryAccessManager, ShutdownMode};
pub use error::{StoreError, StoreResult};
pub use git::{is_git_repo, GitStore, GitStoreConfig};
pub use status::StoreStatus;
pub use store::{RevisionId, VersionedStore};
