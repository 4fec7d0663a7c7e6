//! Frontier Archive Core Library
//!
//! Keeps, per puzzle, the set of solutions that no other solution beats on
//! every scored dimension, and persists that set inside a versioned store.
//!
//! - [`Solution`], [`ScoreVector`], [`Puzzle`], [`Game`]: value types
//! - [`Frontier`]: load, dominance evaluation, persistence of one puzzle's set
//! - [`ArchiveService`]: the locked load → insert → commit pipeline

pub mod archive;
pub mod config;
pub mod error;
pub mod frontier;
pub mod game;
pub mod metrics;
pub mod obs;
pub mod puzzle;
pub mod registry;
pub mod score;
pub mod solution;
pub mod telemetry;

pub use archive::{ArchiveOutcome, ArchiveService};
pub use config::{ArchiveConfig, StoreConfig};
pub use error::{
    ArchiveError, ArchiveResult, ConfigError, FrontierError, FrontierResult, ValidationError,
};
pub use frontier::{Frontier, FrontierChange, FrontierPolicy, Verdict};
pub use game::Game;
pub use puzzle::Puzzle;
pub use registry::ArchiveRegistry;
pub use score::{Qualifier, ScoreVector};
pub use solution::Solution;

pub use frontier_store::{DrainGuard, ShutdownMode};

pub use metrics::{MetricsSnapshot, Outcome, METRICS};
pub use telemetry::init_tracing;

/// Frontier archive version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
