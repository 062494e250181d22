//! Process-wide tracing setup for dashboard hosts and demos.
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt};

/// Fallback directives when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str =
    "info,bevy_app=warn,bevy_ecs=warn,bevy_time=warn,bevy_agenda=info";

static SUBSCRIBER_INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install a `fmt` subscriber filtered by `RUST_LOG`, else [`DEFAULT_LOG_FILTER`].
pub fn init_logging() -> bool {
    init_logging_with(DEFAULT_LOG_FILTER)
}

/// Like [`init_logging`] with caller-provided fallback directives, e.g.
/// `"warn,bevy_agenda::overlay=trace"` while chasing a popup issue.
///
/// Only the first call in a process has an effect. Returns `false` when some
/// other global subscriber was installed first.
pub fn init_logging_with(fallback: &str) -> bool {
    *SUBSCRIBER_INSTALLED.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    })
}
