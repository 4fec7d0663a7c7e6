//! Error taxonomy for the archive pipeline.

use std::path::PathBuf;

use frontier_store::StoreError;

use crate::game::Game;

/// Errors produced while validating a candidate solution.
///
/// Raised before any store lock is taken; no repository state is touched.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {field} `{value}`: use letters, digits, `_`, `-` or `.`, starting with a letter or digit")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("{game} scores have {expected} dimensions, got {actual}")]
    ArityMismatch {
        game: Game,
        expected: usize,
        actual: usize,
    },

    #[error("{game} scores have no `{qualifier}` qualifier")]
    UnknownQualifier { game: Game, qualifier: String },

    #[error("solution content must not be empty")]
    EmptyContent,

    #[error("could not parse score `{0}`")]
    MalformedScore(String),

    #[error("unknown game `{0}`")]
    UnknownGame(String),
}

/// Errors produced while loading or persisting a frontier.
#[derive(Debug, thiserror::Error)]
pub enum FrontierError {
    /// Reading or writing the puzzle directory failed. Recoverable: the
    /// archive rolls the directory back and reports "no change".
    #[error("frontier io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An existing frontier file is malformed or contradicts its name.
    #[error("inconsistent frontier file {path}: {reason}")]
    Inconsistent { path: PathBuf, reason: String },
}

impl FrontierError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrontierError::Io { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FrontierError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn inconsistent(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FrontierError::Inconsistent {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for frontier operations.
pub type FrontierResult<T> = std::result::Result<T, FrontierError>;

/// Archive pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("invalid solution: {0}")]
    Validation(#[from] ValidationError),

    #[error("frontier store inconsistency: {0}")]
    Frontier(#[from] FrontierError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("no archive is configured for {0}")]
    UnknownGame(Game),

    #[error("archive task stopped before finishing: {0}")]
    Aborted(String),
}

/// Result type for archive operations.
pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

/// Errors produced while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("more than one store configured for {0}")]
    DuplicateStore(Game),
}
