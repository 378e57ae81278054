//! Fixed-window arithmetic.

use std::time::Duration;

/// Index of the window containing `now_ms`.
pub(crate) fn window_index(now_ms: u64, window_ms: u64) -> u64 {
    now_ms / window_ms.max(1)
}

pub(crate) fn window_start(index: u64, window_ms: u64) -> u64 {
    index.saturating_mul(window_ms)
}

/// Time left until the window containing `now_ms` ends, at least one second
/// and rounded up to whole seconds so `Retry-After` never undershoots.
pub(crate) fn retry_after(now_ms: u64, window_ms: u64) -> Duration {
    let window_ms = window_ms.max(1);
    let end = window_start(window_index(now_ms, window_ms) + 1, window_ms);
    let remaining_ms = end.saturating_sub(now_ms);
    Duration::from_secs(remaining_ms.div_ceil(1000).max(1))
}

/// Store key for one (endpoint, identity, window) counter.
pub(crate) fn counter_key(endpoint: &str, identity: &str, index: u64) -> String {
    format!("ratelimit:{}:{}:{}", endpoint, identity, index)
}
