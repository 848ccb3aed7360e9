use tokio::time::Instant;

/// Milliseconds on a clock anchored at `origin`. Backed by tokio's clock so
/// paused-time tests control it.
pub(super) fn millis_since(origin: Instant) -> u64 {
    origin.elapsed().as_millis() as u64
}

/// Whole seconds between two millisecond stamps, never negative.
pub(super) fn whole_seconds_between(from_ms: u64, to_ms: u64) -> i64 {
    (to_ms.saturating_sub(from_ms) / 1_000) as i64
}
