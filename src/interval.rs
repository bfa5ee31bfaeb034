//! Interval gate: the "has enough time elapsed" predicate behind every
//! periodic task in the main loop.
//!
//! Timestamps are monotonic milliseconds since boot truncated to `u32`.
//! Comparisons use wrapping subtraction, so a gate keeps working across the
//! ~49.7-day rollover exactly like the classic `millis()` idiom.

/// Check whether `interval_ms` has passed since `*last_ms`.
///
/// On `true`, `*last_ms` is advanced to `now_ms`.  On `false` nothing is
/// touched.
pub fn elapsed(last_ms: &mut u32, interval_ms: u32, now_ms: u32) -> bool {
    if now_ms.wrapping_sub(*last_ms) >= interval_ms {
        *last_ms = now_ms;
        true
    } else {
        false
    }
}

/// A single periodic timer owning its own last-fired timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalGate {
    last_ms: u32,
    interval_ms: u32,
}

impl IntervalGate {
    /// Gate whose first window starts at boot (t = 0).
    pub fn new(interval_ms: u32) -> Self {
        Self {
            last_ms: 0,
            interval_ms,
        }
    }

    /// Gate that is already due at `now_ms`, so the first poll fires.
    pub fn primed(interval_ms: u32, now_ms: u32) -> Self {
        Self {
            last_ms: now_ms.wrapping_sub(interval_ms),
            interval_ms,
        }
    }

    /// Fire-and-advance: see [`elapsed`].
    pub fn poll(&mut self, now_ms: u32) -> bool {
        elapsed(&mut self.last_ms, self.interval_ms, now_ms)
    }

    /// Same predicate as [`poll`](Self::poll) but leaves the timestamp alone.
    /// Used where the timestamp only advances after the work succeeded.
    pub fn is_due(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_ms) >= self.interval_ms
    }

    /// Record `now_ms` as the last time the gated work completed.
    pub fn mark(&mut self, now_ms: u32) {
        self.last_ms = now_ms;
    }

    pub fn last_ms(&self) -> u32 {
        self.last_ms
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}
