//! Error types for frontier-store

use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while operating on a versioned store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The configured path is not inside a git work tree
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    /// A path handed to the store lies outside its working tree
    #[error("path is outside the working tree: {0}")]
    InvalidPath(PathBuf),

    /// A git invocation exited unsuccessfully
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The commit was created locally but could not be pushed; it has been undone
    #[error("push of {revision} failed (local commit rolled back): {reason}")]
    PushFailed { revision: String, reason: String },

    /// A command returned output that could not be interpreted
    #[error("unexpected output from `{command}`: {output}")]
    UnexpectedOutput { command: String, output: String },

    /// The cross-process store lock could not be taken
    #[error("failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error (spawning git, touching the working tree)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
