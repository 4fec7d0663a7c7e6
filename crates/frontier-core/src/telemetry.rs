//! Global tracing setup for the `frontier-archive` binary.
//!
//! The filter comes from `FRONTIER_LOG`, then `RUST_LOG`, then the level the
//! caller passes. Only the first [`init_tracing`] call in a process installs
//! a subscriber.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "FRONTIER_LOG";

/// First non-blank directive among the two variables, else `level`.
fn filter_directive(frontier_log: Option<String>, rust_log: Option<String>, level: Level) -> String {
    [frontier_log, rust_log]
        .into_iter()
        .flatten()
        .find(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| level.as_str().to_ascii_lowercase())
}

fn env_filter(level: Level) -> EnvFilter {
    let directive = filter_directive(
        std::env::var(LOG_ENV).ok(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        level,
    );
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the global subscriber, writing JSON lines when `json` is set.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let json_layer = json.then(|| fmt::layer().with_target(false).json());
    let text_layer = (!json).then(|| fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .is_ok()
}
