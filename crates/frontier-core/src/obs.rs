//! Structured observability hooks for archive attempts.
//!
//! This module provides:
//! - An archive-scoped tracing span tagged with a fresh `archive_id`
//! - Emission functions for the attempt lifecycle: start, reject, commit, rollback
//!
//! Events are emitted at `info!` level (filter with `FRONTIER_LOG`).
//! For JSON output, pass `json = true` to [`crate::init_tracing`].

use tracing::{info, warn, Span};

/// Span covering one archive attempt.
///
/// The span is attached with `Instrument` rather than entered, so it follows
/// the future across await points.
///
/// # Example
///
/// ```ignore
/// async { /* locked section */ }.instrument(archive_span("space_chem", "p", "100/1/10")).await
/// ```
pub fn archive_span(game: &str, puzzle: &str, score: &str) -> Span {
    let archive_id = uuid::Uuid::new_v4();
    tracing::info_span!(
        "frontier.archive",
        archive_id = %archive_id,
        game = %game,
        puzzle = %puzzle,
        score = %score,
    )
}

/// Emit event: an archive attempt took the store lock.
pub fn emit_archive_started(store: &str, content_digest: Option<&str>) {
    info!(
        event = "archive.started",
        store = %store,
        score_only = content_digest.is_none(),
        content_digest = content_digest.map(|d| &d[..12.min(d.len())]).unwrap_or("-"),
    );
}

/// Emit event: a non-waiting attempt found the store locked.
pub fn emit_store_busy(store: &str) {
    info!(event = "archive.busy", store = %store);
}

/// Emit event: the candidate was beaten or tied by an existing member.
pub fn emit_archive_rejected(by: &str) {
    info!(event = "archive.rejected", by = %by);
}

/// Emit event: the candidate was accepted but the tree did not change.
pub fn emit_archive_unchanged() {
    info!(event = "archive.unchanged");
}

/// Emit event: the frontier change was committed and pushed.
pub fn emit_archive_committed(revision: &str, displaced: usize, files: usize) {
    info!(
        event = "archive.committed",
        revision = %revision,
        displaced = displaced,
        files = files,
    );
}

/// Emit event: the puzzle directory was rolled back after a failure (warning level).
pub fn emit_archive_rolled_back(error: &dyn std::fmt::Display) {
    warn!(event = "archive.rolled_back", error = %error);
}

/// Emit event: rolling back itself failed (warning level).
pub fn emit_rollback_failed(error: &dyn std::fmt::Display) {
    warn!(event = "archive.rollback_failed", error = %error);
}
