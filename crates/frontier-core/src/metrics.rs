//! Process-wide counters of archive outcomes.
//!
//! Call sites bump a counter with [`Metrics::record`] (or one of the `inc_*`
//! shorthands). [`Metrics::flush`] emits the totals as one `tracing::info!`
//! event, which the CLI does before exiting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// How one archive attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A frontier change was committed and pushed.
    Archived,
    /// An existing member dominated or tied the candidate.
    Rejected,
    /// The candidate was accepted but rewrote identical bytes.
    Unchanged,
    /// The puzzle directory was reset after a failure.
    RolledBack,
}

impl Outcome {
    const ALL: [Outcome; 4] = [
        Outcome::Archived,
        Outcome::Rejected,
        Outcome::Unchanged,
        Outcome::RolledBack,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Archived => "archived",
            Outcome::Rejected => "rejected",
            Outcome::Unchanged => "unchanged",
            Outcome::RolledBack => "rolled_back",
        }
    }
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub archived: u64,
    pub rejected: u64,
    pub unchanged: u64,
    pub rolled_back: u64,
}

pub struct Metrics {
    counts: [AtomicU64; Outcome::ALL.len()],
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            counts: [
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
            ],
        }
    }

    pub fn record(&self, outcome: Outcome) {
        self.counts[outcome.slot()].fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = outcome.as_str(), "counter incremented");
    }

    pub fn inc_archived(&self) {
        self.record(Outcome::Archived);
    }

    pub fn inc_rejected(&self) {
        self.record(Outcome::Rejected);
    }

    pub fn inc_unchanged(&self) {
        self.record(Outcome::Unchanged);
    }

    pub fn inc_rolled_back(&self) {
        self.record(Outcome::RolledBack);
    }

    pub fn count(&self, outcome: Outcome) -> u64 {
        self.counts[outcome.slot()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            archived: self.count(Outcome::Archived),
            rejected: self.count(Outcome::Rejected),
            unchanged: self.count(Outcome::Unchanged),
            rolled_back: self.count(Outcome::RolledBack),
        }
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        let snapshot = self.snapshot();
        tracing::info!(
            metric = "flush",
            archived = snapshot.archived,
            rejected = snapshot.rejected,
            unchanged = snapshot.unchanged,
            rolled_back = snapshot.rolled_back,
        );
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for count in &self.counts {
            count.store(0, Ordering::Relaxed);
        }
    }
}
